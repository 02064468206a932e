//! Writer settings.

use chrono::NaiveDateTime;

use super::MissingValue;

const SAS_VERSION: &str = "9.4";
const OS_NAME: &str = "LINUX";

/// Header fields stamped into written files.
#[derive(Debug, Clone)]
pub struct XptWriterOptions {
    /// At most 8 characters.
    pub sas_version: String,
    /// At most 8 characters.
    pub os_name: String,
    /// Header timestamp; the local clock when unset.
    pub created: Option<NaiveDateTime>,
    /// Code written for null and non-finite numerics.
    pub default_missing: MissingValue,
}

impl Default for XptWriterOptions {
    fn default() -> Self {
        Self {
            sas_version: SAS_VERSION.to_string(),
            os_name: OS_NAME.to_string(),
            created: None,
            default_missing: MissingValue::Standard,
        }
    }
}

impl XptWriterOptions {
    #[must_use]
    pub fn created_at(mut self, datetime: NaiveDateTime) -> Self {
        self.created = Some(datetime);
        self
    }

    /// `ddMMMyy:hh:mm:ss`, upper case, as the library and member headers
    /// expect.
    pub fn header_timestamp(&self) -> String {
        self.created
            .unwrap_or_else(|| chrono::Local::now().naive_local())
            .format("%d%b%y:%H:%M:%S")
            .to_string()
            .to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn header_timestamp_is_upper_case() {
        let at = NaiveDate::from_ymd_opt(2016, 4, 30)
            .unwrap()
            .and_hms_opt(14, 30, 45)
            .unwrap();
        let opts = XptWriterOptions::default().created_at(at);
        assert_eq!(opts.header_timestamp(), "30APR16:14:30:45");
    }
}
