use serde::{Deserialize, Serialize};

use super::lines::Line;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatsStatus {
    Available,
    FastFilling,
    SoldOut,
}

impl SeatsStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SeatsStatus::Available => "Available",
            SeatsStatus::FastFilling => "Fast Filling",
            SeatsStatus::SoldOut => "Sold Out",
        }
    }

    /// Status named by a single line. Several categories on one line resolve
    /// available > fast filling > sold out > full house.
    pub fn from_line(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        if lower.contains("available") {
            Some(SeatsStatus::Available)
        } else if lower.contains("fast filling") || lower.contains("filling fast") {
            Some(SeatsStatus::FastFilling)
        } else if lower.contains("sold out") || (lower.contains("full") && lower.contains("house")) {
            Some(SeatsStatus::SoldOut)
        } else {
            None
        }
    }
}

/// The first line carrying an occupancy keyword decides the status.
pub fn scan_status(lines: &[Line]) -> Option<SeatsStatus> {
    lines.iter().find_map(|line| SeatsStatus::from_line(&line.text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::lines::normalize_lines;

    #[test]
    fn test_document_order_wins() {
        let lines = normalize_lines("Hindi\nFast Filling\nBook\nSold Out");
        assert_eq!(scan_status(&lines), Some(SeatsStatus::FastFilling));
    }

    #[test]
    fn test_same_line_priority() {
        assert_eq!(SeatsStatus::from_line("Sold out | Available soon"), Some(SeatsStatus::Available));
        assert_eq!(SeatsStatus::from_line("SOLD OUT - filling fast"), Some(SeatsStatus::FastFilling));
        assert_eq!(SeatsStatus::from_line("Full House"), Some(SeatsStatus::SoldOut));
        assert_eq!(SeatsStatus::from_line("Full refund policy"), None);
    }

    #[test]
    fn test_no_keyword() {
        assert_eq!(scan_status(&normalize_lines("7:30 PM\n₹500")), None);
        assert_eq!(scan_status(&[]), None);
    }
}
