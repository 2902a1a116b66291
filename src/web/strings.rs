//! Page strings for the languages the status page is offered in.

use s85_status::status::DepartureStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLanguage {
    German,
    English,
}

impl PageLanguage {
    pub const DEFAULT: PageLanguage = PageLanguage::English;

    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code.split(['-', '_']).next()?.trim().to_ascii_lowercase();
        match primary.as_str() {
            "de" => Some(PageLanguage::German),
            "en" => Some(PageLanguage::English),
            _ => None,
        }
    }

    /// Picks the first supported language from an `Accept-Language` value.
    ///
    /// Quality values are ignored; browsers list languages by preference.
    pub fn from_accept_language(header: &str) -> Option<Self> {
        header
            .split(',')
            .filter_map(|item| item.split(';').next())
            .find_map(Self::from_code)
    }

    pub fn code(self) -> &'static str {
        match self {
            PageLanguage::German => "de",
            PageLanguage::English => "en",
        }
    }

    pub fn title(self, line: &str) -> String {
        match self {
            PageLanguage::German => format!("Fährt die {line}?"),
            PageLanguage::English => format!("Is the {line} running?"),
        }
    }

    pub fn answer(self, status: DepartureStatus) -> &'static str {
        match (self, status) {
            (PageLanguage::German, DepartureStatus::Running) => "Ja",
            (PageLanguage::German, DepartureStatus::NotRunning) => "Nein",
            (PageLanguage::German, DepartureStatus::ClosingTime) => "Betriebsschluss",
            (PageLanguage::German, DepartureStatus::NoInformation) => "Keine Informationen",
            (PageLanguage::English, DepartureStatus::Running) => "Yes",
            (PageLanguage::English, DepartureStatus::NotRunning) => "No",
            (PageLanguage::English, DepartureStatus::ClosingTime) => "Service has ended for today",
            (PageLanguage::English, DepartureStatus::NoInformation) => "No information available",
        }
    }

    pub fn updated_label(self) -> &'static str {
        match self {
            PageLanguage::German => "Stand",
            PageLanguage::English => "Last updated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(PageLanguage::from_code("de"), Some(PageLanguage::German));
        assert_eq!(PageLanguage::from_code("de-AT"), Some(PageLanguage::German));
        assert_eq!(PageLanguage::from_code("EN_gb"), Some(PageLanguage::English));
        assert_eq!(PageLanguage::from_code("fr"), None);
    }

    #[test]
    fn test_from_accept_language_takes_first_supported() {
        assert_eq!(
            PageLanguage::from_accept_language("fr-FR,fr;q=0.9,de;q=0.8,en;q=0.7"),
            Some(PageLanguage::German)
        );
        assert_eq!(
            PageLanguage::from_accept_language("en-US,en;q=0.9"),
            Some(PageLanguage::English)
        );
        assert_eq!(PageLanguage::from_accept_language("pl, fr"), None);
        assert_eq!(PageLanguage::from_accept_language(""), None);
    }

    #[test]
    fn test_title_names_line() {
        assert_eq!(PageLanguage::German.title("S85"), "Fährt die S85?");
    }
}
