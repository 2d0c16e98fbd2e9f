// Flags
// Whitespace-separated flag words attached to spec nodes

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Flag {
    #[default]
    None,
    /// FOCUS: restrict the run to focused subtrees
    Focus,
    /// PENDING: skip the subtree
    Skip,
}

/// Result of reading a flag string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagReading {
    pub flag: Flag,
    pub warnings: Vec<String>,
}

/// Interpret a flag string. When both FOCUS and PENDING are present the
/// last one wins.
pub fn read_flag(text: &str) -> FlagReading {
    let mut reading = FlagReading::default();
    let mut seen_focus = false;
    let mut seen_pending = false;

    for word in text.split_whitespace() {
        match word {
            "FOCUS" => {
                seen_focus = true;
                reading.flag = Flag::Focus;
            }
            "PENDING" => {
                seen_pending = true;
                reading.flag = Flag::Skip;
            }
            _ if word.chars().all(|c| c.is_ascii_uppercase()) => {
                reading.warnings.push(format!(
                    "Unrecognized all uppercase flag \"{}\". It has been ignored.",
                    word
                ));
            }
            _ => {}
        }
    }

    if seen_focus && seen_pending {
        let kept = match reading.flag {
            Flag::Focus => "FOCUS",
            _ => "PENDING",
        };
        reading.warnings.push(format!(
            "Both FOCUS and PENDING have been found among the flags of this node. {} has been kept.",
            kept
        ));
    }

    reading
}
