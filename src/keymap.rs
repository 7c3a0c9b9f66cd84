#![forbid(unsafe_code)]

use crate::model::{Command, KeyBinding};

pub const KEYMAP: [KeyBinding; 15] = [
    KeyBinding { key: 'w', label: "up", command: Command::CursorUp },
    KeyBinding { key: 's', label: "down", command: Command::CursorDown },
    KeyBinding { key: 'a', label: "left panel", command: Command::LeftPane },
    KeyBinding { key: 'd', label: "right panel", command: Command::RightPane },
    KeyBinding { key: 'm', label: "select", command: Command::ToggleSelect },
    KeyBinding { key: 'u', label: "unselect all", command: Command::ClearSelection },
    KeyBinding { key: 'c', label: "copy", command: Command::Mark },
    KeyBinding { key: 'v', label: "paste", command: Command::Paste },
    KeyBinding { key: 'n', label: "new file", command: Command::NewFile },
    KeyBinding { key: 'k', label: "new dir", command: Command::NewDir },
    KeyBinding { key: 'l', label: "delete", command: Command::Delete },
    KeyBinding { key: 'o', label: "open", command: Command::Enter },
    KeyBinding { key: 'p', label: "parent", command: Command::Parent },
    KeyBinding { key: 'r', label: "reload", command: Command::Reload },
    KeyBinding { key: 'q', label: "quit", command: Command::Quit },
];

pub fn command_for(key: char) -> Option<Command> {
    KEYMAP.iter().find(|b| b.key == key).map(|b| b.command)
}

pub fn help_line() -> String {
    KEYMAP
        .iter()
        .map(|b| format!("{} {}", b.key, b.label))
        .collect::<Vec<_>>()
        .join(", ")
}
