use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use serde::Serialize;

use crate::favorites::MAX_POSITIONS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Platform {
    Linux,
    Windows,
    MacOS,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Linux, Platform::Windows, Platform::MacOS];

    pub fn label(self) -> &'static str {
        match self {
            Platform::Linux => "Linux",
            Platform::Windows => "Windows",
            Platform::MacOS => "macOS",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Platform::Windows => "> ",
            Platform::Linux | Platform::MacOS => "$ ",
        }
    }

    fn slot(self) -> usize {
        match self {
            Platform::Linux => 0,
            Platform::Windows => 1,
            Platform::MacOS => 2,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "linux" => Ok(Platform::Linux),
            "windows" | "win" => Ok(Platform::Windows),
            "macos" | "mac" | "osx" => Ok(Platform::MacOS),
            other => Err(format!(
                "unknown platform '{other}' (expected linux, windows or macos)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Platform(Platform),
    Favorites,
}

impl Tab {
    pub const ALL: [Tab; 4] = [
        Tab::Platform(Platform::Linux),
        Tab::Platform(Platform::Windows),
        Tab::Platform(Platform::MacOS),
        Tab::Favorites,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Platform(Platform::Linux) => " Linux ",
            Tab::Platform(Platform::Windows) => " Windows ",
            Tab::Platform(Platform::MacOS) => " macOS ",
            Tab::Favorites => " ★ Favorites ",
        }
    }

    pub fn position(self) -> usize {
        match self {
            Tab::Platform(platform) => platform.slot(),
            Tab::Favorites => 3,
        }
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.position() + 1) % Tab::ALL.len()]
    }

    pub fn previous(self) -> Tab {
        Tab::ALL[(self.position() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "favorites" | "favourites" | "fav" => Ok(Tab::Favorites),
            other => other
                .parse::<Platform>()
                .map(Tab::Platform)
                .map_err(|_| format!("unknown tab '{other}' (expected linux, windows, macos or favorites)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandRecord {
    pub name: String,
    pub description: String,
    pub category: String,
    pub examples: String,
    pub dependencies: String,
}

impl CommandRecord {
    fn new(
        name: &str,
        description: &str,
        category: &str,
        examples: &str,
        dependencies: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            examples: examples.to_string(),
            dependencies: dependencies.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    tables: [Vec<CommandRecord>; 3],
}

impl Catalog {
    pub fn from_tables(
        linux: Vec<CommandRecord>,
        windows: Vec<CommandRecord>,
        macos: Vec<CommandRecord>,
    ) -> Result<Self> {
        let tables = [linux, windows, macos];
        for (platform, table) in Platform::ALL.iter().zip(&tables) {
            if table.len() > MAX_POSITIONS {
                bail!(
                    "{platform} table has {} commands; at most {MAX_POSITIONS} are addressable",
                    table.len()
                );
            }
        }
        Ok(Self { tables })
    }

    pub fn builtin() -> Result<Self> {
        Self::from_tables(linux_commands(), windows_commands(), macos_commands())
    }

    pub fn records_for(&self, platform: Platform) -> &[CommandRecord] {
        &self.tables[platform.slot()]
    }

    pub fn get(&self, platform: Platform, position: usize) -> Option<&CommandRecord> {
        self.records_for(platform).get(position)
    }

    pub fn len(&self) -> usize {
        self.tables.iter().map(Vec::len).sum()
    }
}

fn linux_commands() -> Vec<CommandRecord> {
    vec![
        CommandRecord::new(
            "ls",
            "List directory contents",
            "File System",
            "$ ls -l      # List in long format\n$ ls -a      # List all files including hidden",
            "Core utility",
        ),
        CommandRecord::new(
            "grep",
            "Search text using patterns",
            "Text Processing",
            "$ grep 'pattern' file.txt\n$ ps aux | grep 'process'",
            "Core utility",
        ),
        CommandRecord::new(
            "chmod",
            "Change file permissions",
            "Permissions",
            "$ chmod 755 script.sh\n$ chmod u+x file",
            "Core utility",
        ),
        CommandRecord::new(
            "ssh",
            "Secure shell remote login",
            "Networking",
            "$ ssh user@192.168.1.100\n$ ssh -i key.pem user@server.com",
            "openssh-client",
        ),
        CommandRecord::new(
            "find",
            "Search for files in directory hierarchy",
            "File System",
            "$ find . -name '*.py'\n$ find /var/log -size +10M",
            "Core utility",
        ),
        CommandRecord::new(
            "apt-get",
            "Package management utility (Debian)",
            "Package Management",
            "$ sudo apt-get update\n$ sudo apt-get install nginx",
            "apt",
        ),
        CommandRecord::new(
            "systemctl",
            "Control systemd system and service manager",
            "System Management",
            "$ systemctl start nginx\n$ systemctl status ssh",
            "systemd",
        ),
        CommandRecord::new(
            "iptables",
            "Administration tool for IPv4 packet filtering",
            "Networking",
            "$ iptables -L\n$ iptables -A INPUT -p tcp --dport 22 -j ACCEPT",
            "iptables",
        ),
    ]
}

fn windows_commands() -> Vec<CommandRecord> {
    vec![
        CommandRecord::new(
            "dir",
            "List directory contents",
            "File System",
            "> dir /w     # Wide list format\n> dir /a     # List all files including hidden",
            "Built-in",
        ),
        CommandRecord::new(
            "ipconfig",
            "Display network configuration",
            "Networking",
            "> ipconfig\n> ipconfig /all\n> ipconfig /release",
            "Built-in",
        ),
        CommandRecord::new(
            "tasklist",
            "Display running processes",
            "Process Management",
            "> tasklist\n> tasklist /svc",
            "Built-in",
        ),
        CommandRecord::new(
            "netsh",
            "Network shell configuration tool",
            "Networking",
            "> netsh wlan show profiles\n> netsh advfirewall set allprofiles state off",
            "Built-in",
        ),
        CommandRecord::new(
            "choco",
            "Chocolatey package manager",
            "Package Management",
            "> choco install git\n> choco upgrade all",
            "Chocolatey (https://chocolatey.org/install)",
        ),
        CommandRecord::new(
            "powershell",
            "Task automation framework",
            "Scripting",
            "> powershell Get-Process\n> powershell Get-Service",
            "Built-in",
        ),
        CommandRecord::new(
            "netstat",
            "Display network connections",
            "Networking",
            "> netstat -ano\n> netstat -ab",
            "Built-in",
        ),
        CommandRecord::new(
            "sfc",
            "System File Checker",
            "System Management",
            "> sfc /scannow",
            "Built-in",
        ),
    ]
}

fn macos_commands() -> Vec<CommandRecord> {
    vec![
        CommandRecord::new(
            "ls",
            "List directory contents",
            "File System",
            "$ ls -l\n$ ls -a",
            "Core utility",
        ),
        CommandRecord::new(
            "brew",
            "Homebrew package manager",
            "Package Management",
            "$ brew install wget\n$ brew update",
            "Homebrew (https://brew.sh/)",
        ),
        CommandRecord::new(
            "say",
            "Convert text to speech",
            "Utilities",
            "$ say \"Hello World\"\n$ say -v Daniel \"How are you?\"",
            "Built-in",
        ),
        CommandRecord::new(
            "diskutil",
            "Disk management utility",
            "Storage",
            "$ diskutil list\n$ diskutil eject /dev/disk2",
            "Built-in",
        ),
        CommandRecord::new(
            "networksetup",
            "Network configuration tool",
            "Networking",
            "$ networksetup -listallnetworkservices\n$ networksetup -setdnsservers Wi-Fi 8.8.8.8",
            "Built-in",
        ),
        CommandRecord::new(
            "launchctl",
            "Service management framework",
            "System Management",
            "$ launchctl list\n$ launchctl load ~/Library/LaunchAgents/my.script.plist",
            "Built-in",
        ),
        CommandRecord::new(
            "airport",
            "Wi-Fi diagnostic tool",
            "Networking",
            "$ airport -s\n$ airport -I",
            "Built-in (located at /System/Library/PrivateFrameworks/Apple80211.framework/Resources/airport)",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> CommandRecord {
        CommandRecord::new(name, "", "Utilities", "", "")
    }

    #[test]
    fn builtin_tables_keep_insertion_order() {
        let catalog = Catalog::builtin().unwrap();
        let linux: Vec<&str> = catalog
            .records_for(Platform::Linux)
            .iter()
            .map(|record| record.name.as_str())
            .collect();
        assert_eq!(
            linux,
            vec!["ls", "grep", "chmod", "ssh", "find", "apt-get", "systemctl", "iptables"]
        );
        assert_eq!(catalog.get(Platform::Windows, 1).unwrap().name, "ipconfig");
        assert_eq!(catalog.get(Platform::MacOS, 1).unwrap().name, "brew");
        assert_eq!(catalog.len(), 23);
    }

    #[test]
    fn builtin_tables_stay_addressable_by_favorite_keys() {
        let catalog = Catalog::builtin().unwrap();
        for platform in Platform::ALL {
            assert!(catalog.records_for(platform).len() <= MAX_POSITIONS);
        }
    }

    #[test]
    fn names_repeat_across_platforms() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.get(Platform::Linux, 0).unwrap().name, "ls");
        assert_eq!(catalog.get(Platform::MacOS, 0).unwrap().name, "ls");
        assert_ne!(
            catalog.get(Platform::Linux, 0).unwrap().examples,
            catalog.get(Platform::MacOS, 0).unwrap().examples
        );
    }

    #[test]
    fn get_out_of_range_is_none() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.get(Platform::MacOS, 7).is_none());
    }

    #[test]
    fn from_tables_rejects_oversized_table() {
        let oversized: Vec<CommandRecord> = (0..=MAX_POSITIONS)
            .map(|index| record(&format!("cmd{index}")))
            .collect();
        let err = Catalog::from_tables(Vec::new(), oversized, Vec::new())
            .unwrap_err()
            .to_string();
        assert!(err.contains("Windows"));
    }

    #[test]
    fn parses_tabs_and_platforms() {
        assert_eq!("Linux".parse::<Tab>(), Ok(Tab::Platform(Platform::Linux)));
        assert_eq!("mac".parse::<Tab>(), Ok(Tab::Platform(Platform::MacOS)));
        assert_eq!("favorites".parse::<Tab>(), Ok(Tab::Favorites));
        assert!("beos".parse::<Tab>().is_err());
    }

    #[test]
    fn tab_cycle_wraps() {
        assert_eq!(Tab::Favorites.next(), Tab::Platform(Platform::Linux));
        assert_eq!(Tab::Platform(Platform::Linux).previous(), Tab::Favorites);
        assert_eq!(
            Tab::Platform(Platform::Windows).next(),
            Tab::Platform(Platform::MacOS)
        );
    }
}
