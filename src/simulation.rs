use crate::model::{CommandRecord, Platform};

const GENERIC_OUTPUT: &[&str] = &[
    "Command executed successfully",
    "Output generated for demonstration purposes",
];

fn canned_output(name: &str) -> &'static [&'static str] {
    match name {
        "ls" => &["file1.txt\tfile2.txt\tdirectory/", "report.pdf\timage.png\t"],
        "grep" => &[
            "search_result: line 42: found the pattern",
            "search_result: line 87: another match",
        ],
        "ipconfig" => &[
            "Ethernet adapter Ethernet0:",
            "",
            "   IPv4 Address. . . . . . . . . . . : 192.168.1.100",
            "   Subnet Mask . . . . . . . . . . . : 255.255.255.0",
            "   Default Gateway . . . . . . . . . : 192.168.1.1",
        ],
        "brew" => &[
            "==> Downloading wget-1.21.2.catalina.bottle.tar.gz",
            "######################################################################## 100.0%",
            "==> Pouring wget-1.21.2.catalina.bottle.tar.gz",
            "🍺  /usr/local/Cellar/wget/1.21.2: 50 files, 3.7MB",
        ],
        _ => GENERIC_OUTPUT,
    }
}

pub fn transcript(platform: Platform, record: &CommandRecord) -> String {
    let mut output = format!("{}{}\n\n", platform.prompt(), record.name);
    for line in canned_output(&record.name) {
        output.push_str(line);
        output.push('\n');
    }
    output.push_str("\nSimulation complete. Output is for demonstration only.");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Catalog;

    #[test]
    fn ls_transcript_has_listing() {
        let catalog = Catalog::builtin().unwrap();
        let ls = catalog.get(Platform::Linux, 0).unwrap();
        let output = transcript(Platform::Linux, ls);
        assert!(output.starts_with("$ ls\n\n"));
        assert!(output.lines().any(|line| line == "file1.txt\tfile2.txt\tdirectory/"));
        assert!(output.ends_with("Simulation complete. Output is for demonstration only."));
    }

    #[test]
    fn windows_records_use_windows_prompt() {
        let catalog = Catalog::builtin().unwrap();
        let ipconfig = catalog.get(Platform::Windows, 1).unwrap();
        let output = transcript(Platform::Windows, ipconfig);
        assert!(output.starts_with("> ipconfig\n\n"));
        assert!(output.contains("   Default Gateway . . . . . . . . . : 192.168.1.1\n"));
    }

    #[test]
    fn unknown_names_fall_back_to_generic_output() {
        let catalog = Catalog::builtin().unwrap();
        let say = catalog.get(Platform::MacOS, 2).unwrap();
        let output = transcript(Platform::MacOS, say);
        assert_eq!(
            output,
            "$ say\n\nCommand executed successfully\nOutput generated for demonstration purposes\n\nSimulation complete. Output is for demonstration only."
        );
    }

    #[test]
    fn lookup_is_by_exact_name() {
        let record = CommandRecord {
            name: "LS".to_string(),
            description: String::new(),
            category: String::new(),
            examples: String::new(),
            dependencies: String::new(),
        };
        assert!(transcript(Platform::Linux, &record).contains("Command executed successfully"));
    }
}
