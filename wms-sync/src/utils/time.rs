//! 时间工具函数 - ERP 日期格式

use chrono::{Local, NaiveDate};

/// ERP 日期格式 (dd.mm.yyyy)
pub const ERP_DATE_FORMAT: &str = "%d.%m.%Y";

/// Format a date the way the ERP header fields expect it
pub fn erp_date(date: NaiveDate) -> String {
    date.format(ERP_DATE_FORMAT).to_string()
}

/// Today in local time, ERP formatted (posting and document date)
pub fn erp_today() -> String {
    erp_date(Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erp_date_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(erp_date(date), "07.03.2024");
    }

    #[test]
    fn test_erp_today_shape() {
        let today = erp_today();
        assert_eq!(today.len(), 10);
        assert_eq!(&today[2..3], ".");
        assert_eq!(&today[5..6], ".");
    }
}
