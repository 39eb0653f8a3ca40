//! Fixed announcement phrases for the two supported languages

use crate::state::{Language, Milestone};

/// Build the spoken / displayed sentence for a milestone
pub fn phrase(language: Language, label: &str, milestone: Milestone) -> String {
    match language {
        Language::English => english(label, milestone),
        Language::Chinese => chinese(label, milestone),
    }
}

fn english(label: &str, milestone: Milestone) -> String {
    match milestone {
        Milestone::Finished => format!("{label}: time's up!"),
        Milestone::Threshold(300) => format!("{label}: five minutes remaining."),
        Milestone::Threshold(120) => format!("{label}: two minutes remaining."),
        Milestone::Threshold(60) => format!("{label}: one minute remaining."),
        Milestone::Threshold(secs) if secs % 60 == 0 && secs > 0 => {
            format!("{label}: {} minutes remaining.", secs / 60)
        }
        Milestone::Threshold(1) => format!("{label}: one second remaining."),
        Milestone::Threshold(secs) => format!("{label}: {secs} seconds remaining."),
    }
}

fn chinese(label: &str, milestone: Milestone) -> String {
    match milestone {
        Milestone::Finished => format!("{label}，時間到！"),
        Milestone::Threshold(300) => format!("{label}，剩下五分鐘。"),
        Milestone::Threshold(120) => format!("{label}，剩下兩分鐘。"),
        Milestone::Threshold(secs) if secs % 60 == 0 && secs > 0 => {
            format!("{label}，剩下{}分鐘。", secs / 60)
        }
        Milestone::Threshold(secs) => format!("{label}，剩下{secs}秒。"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_table() {
        let en = |m| phrase(Language::English, "Table 7", m);
        assert_eq!(en(Milestone::Threshold(300)), "Table 7: five minutes remaining.");
        assert_eq!(en(Milestone::Threshold(120)), "Table 7: two minutes remaining.");
        assert_eq!(en(Milestone::Threshold(600)), "Table 7: 10 minutes remaining.");
        assert_eq!(en(Milestone::Threshold(30)), "Table 7: 30 seconds remaining.");
        assert_eq!(en(Milestone::Finished), "Table 7: time's up!");
    }

    #[test]
    fn chinese_table() {
        let zh = |m| phrase(Language::Chinese, "三號桌", m);
        assert_eq!(zh(Milestone::Threshold(300)), "三號桌，剩下五分鐘。");
        assert_eq!(zh(Milestone::Threshold(120)), "三號桌，剩下兩分鐘。");
        assert_eq!(zh(Milestone::Threshold(600)), "三號桌，剩下10分鐘。");
        assert_eq!(zh(Milestone::Threshold(0)), "三號桌，剩下0秒。");
        assert_eq!(zh(Milestone::Finished), "三號桌，時間到！");
    }
}
