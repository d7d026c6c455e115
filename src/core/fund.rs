//! Fund records scraped from eastmoney and the category enumeration

use super::error::FundError;
use std::fmt::Display;
use std::str::FromStr;

/// Column titles of the ranking dataset, in the order the endpoint emits them.
pub const FUND_RANK_TITLES: [&str; 25] = [
    "code",
    "基金简称",
    "基金编码",
    "日期",
    "单位净值",
    "累计净值",
    "日增长率",
    "近1周",
    "近1月",
    "近3月",
    "近6月",
    "近1年",
    "近2年",
    "近3年",
    "今年来",
    "成立来",
    "成立时间",
    "未知字段1",
    "未知字段2",
    "原费率",
    "折扣费率",
    "未知字段3",
    "未知字段4",
    "未知字段5",
    "未知字段6",
];

/// Sharpe ratio titles of the risk dataset: 1, 2 and 3 years.
pub const FUND_TS_TITLES: [&str; 3] = ["夏普比率近一年", "夏普比率近二年", "夏普比率近三年"];

pub const CODE_COLUMN: &str = "code";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    All,
    Equity,
    Hybrid,
    Bond,
    Index,
    CapitalProtected,
    Qdii,
    Lof,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::All,
        Category::Equity,
        Category::Hybrid,
        Category::Bond,
        Category::Index,
        Category::CapitalProtected,
        Category::Qdii,
        Category::Lof,
    ];

    /// Value of the `ft` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Equity => "gp",
            Category::Hybrid => "hh",
            Category::Bond => "zq",
            Category::Index => "zs",
            Category::CapitalProtected => "bb",
            Category::Qdii => "qdii",
            Category::Lof => "lof",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = FundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| FundError::UnsupportedCategory(s.to_string()))
    }
}

/// One row of the ranking endpoint.
///
/// Growth rates are percentages kept as the strings the endpoint sent; an
/// empty string means the fund has no figure for that window. The unlabeled
/// slots are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FundRecord {
    pub code: String,
    pub short_name: String,
    pub internal_id: String,
    pub date: String,
    pub unit_nav: String,
    pub cumulative_nav: String,
    pub daily_growth: String,
    pub week_growth: String,
    pub month_growth: String,
    pub three_month_growth: String,
    pub six_month_growth: String,
    pub year_growth: String,
    pub two_year_growth: String,
    pub three_year_growth: String,
    pub ytd_growth: String,
    pub since_inception_growth: String,
    pub inception_date: String,
    pub reserved_head: [String; 2],
    pub fee_rate: String,
    pub discounted_fee_rate: String,
    pub reserved_tail: [String; 4],
}

impl FundRecord {
    /// Builds a record from exactly [`FUND_RANK_TITLES`]`.len()` fields.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, FundError> {
        let fields: &[S; 25] = fields.try_into().map_err(|_| {
            FundError::MalformedResponse(format!(
                "expected {} fields per fund, got {}",
                FUND_RANK_TITLES.len(),
                fields.len()
            ))
        })?;
        let [
            code,
            short_name,
            internal_id,
            date,
            unit_nav,
            cumulative_nav,
            daily_growth,
            week_growth,
            month_growth,
            three_month_growth,
            six_month_growth,
            year_growth,
            two_year_growth,
            three_year_growth,
            ytd_growth,
            since_inception_growth,
            inception_date,
            unknown1,
            unknown2,
            fee_rate,
            discounted_fee_rate,
            unknown3,
            unknown4,
            unknown5,
            unknown6,
        ] = fields.each_ref().map(|f| f.as_ref().to_string());

        Ok(FundRecord {
            code,
            short_name,
            internal_id,
            date,
            unit_nav,
            cumulative_nav,
            daily_growth,
            week_growth,
            month_growth,
            three_month_growth,
            six_month_growth,
            year_growth,
            two_year_growth,
            three_year_growth,
            ytd_growth,
            since_inception_growth,
            inception_date,
            reserved_head: [unknown1, unknown2],
            fee_rate,
            discounted_fee_rate,
            reserved_tail: [unknown3, unknown4, unknown5, unknown6],
        })
    }

    /// Splits one comma-joined line from the ranking endpoint.
    pub fn from_line(line: &str) -> Result<Self, FundError> {
        let fields: Vec<&str> = line.split(',').collect();
        Self::from_fields(&fields).map_err(|e| match e {
            FundError::MalformedResponse(reason) => {
                FundError::MalformedResponse(format!("{reason}: {line:?}"))
            }
            other => other,
        })
    }

    /// Fields in [`FUND_RANK_TITLES`] order.
    pub fn to_fields(&self) -> [&str; 25] {
        [
            &self.code,
            &self.short_name,
            &self.internal_id,
            &self.date,
            &self.unit_nav,
            &self.cumulative_nav,
            &self.daily_growth,
            &self.week_growth,
            &self.month_growth,
            &self.three_month_growth,
            &self.six_month_growth,
            &self.year_growth,
            &self.two_year_growth,
            &self.three_year_growth,
            &self.ytd_growth,
            &self.since_inception_growth,
            &self.inception_date,
            &self.reserved_head[0],
            &self.reserved_head[1],
            &self.fee_rate,
            &self.discounted_fee_rate,
            &self.reserved_tail[0],
            &self.reserved_tail[1],
            &self.reserved_tail[2],
            &self.reserved_tail[3],
        ]
        .map(String::as_str)
    }

    /// Trailing returns used by the ranking score: 3y, 2y, 1y, 6m, 3m.
    pub fn trailing_returns(&self) -> [&str; 5] {
        [
            &self.three_year_growth,
            &self.two_year_growth,
            &self.year_growth,
            &self.six_month_growth,
            &self.three_month_growth,
        ]
        .map(String::as_str)
    }
}

/// Labels and values scraped from a fund's detail page, in page order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FundDetailRecord {
    pub code: String,
    pub fields: Vec<(String, String)>,
}

impl FundDetailRecord {
    pub fn new(code: &str) -> Self {
        FundDetailRecord {
            code: code.to_string(),
            fields: Vec::new(),
        }
    }

    /// Adds a field unless the label is already present; the first value wins.
    pub fn insert(&mut self, label: &str, value: &str) -> bool {
        if self.get(label).is_some() {
            return false;
        }
        self.fields.push((label.to_string(), value.to_string()));
        true
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }
}

/// Sharpe ratios from a fund's risk statistics page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FundRiskRecord {
    pub code: String,
    pub sharpe_1y: String,
    pub sharpe_2y: String,
    pub sharpe_3y: String,
}

impl FundRiskRecord {
    /// Values in [`FUND_TS_TITLES`] order.
    pub fn sharpe_values(&self) -> [&str; 3] {
        [&self.sharpe_1y, &self.sharpe_2y, &self.sharpe_3y].map(String::as_str)
    }
}


#[cfg(test)]
mod tests {
    use super::test_data::*;
    use super::*;

    #[test]
    fn test_category_parses_known_codes() {
        assert_eq!("gp".parse::<Category>().unwrap(), Category::Equity);
        assert_eq!("qdii".parse::<Category>().unwrap(), Category::Qdii);
        for category in Category::ALL {
            assert_eq!(category.to_string().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_category_rejects_unknown_codes() {
        for code in ["xyz", "", "GP", "equity"] {
            assert!(matches!(
                code.parse::<Category>(),
                Err(FundError::UnsupportedCategory(c)) if c == code
            ));
        }
    }

    #[test]
    fn test_fund_record_maps_fields_by_position() {
        let record = rank_record("000001", ["30.1", "20.2", "10.3", "5.4", "2.5"]);

        assert_eq!(record.code, "000001");
        assert_eq!(record.short_name, "基金000001");
        assert_eq!(record.three_year_growth, "30.1");
        assert_eq!(record.two_year_growth, "20.2");
        assert_eq!(record.year_growth, "10.3");
        assert_eq!(record.six_month_growth, "5.4");
        assert_eq!(record.three_month_growth, "2.5");
        assert_eq!(record.inception_date, "2015-06-01");
        assert_eq!(record.fee_rate, "1.50%");
        assert_eq!(record.discounted_fee_rate, "0.15%");
        assert_eq!(record.reserved_head, ["", ""]);
        assert_eq!(record.reserved_tail, ["1", "0.15%", "1", ""]);
        assert_eq!(
            record.trailing_returns(),
            ["30.1", "20.2", "10.3", "5.4", "2.5"]
        );
    }

    #[test]
    fn test_fund_record_keeps_opaque_fields_in_place() {
        let line = rank_line("000002", ["", "", "", "", ""]);
        let record = FundRecord::from_line(&line).unwrap();
        assert_eq!(record.to_fields().join(","), line);
    }

    #[test]
    fn test_short_or_long_rows_are_rejected() {
        let line = rank_line("000003", ["1", "2", "3", "4", "5"]);
        let short = line.rsplit_once(',').unwrap().0;
        let long = format!("{line},extra");

        for bad in [short, long.as_str(), "a,b,c"] {
            let err = FundRecord::from_line(bad).unwrap_err();
            assert!(
                matches!(err, FundError::MalformedResponse(ref reason) if reason.contains("expected 25 fields")),
                "{err}"
            );
        }
    }

    #[test]
    fn test_detail_record_keeps_first_value_for_duplicate_labels() {
        let mut record = FundDetailRecord::new("000001");
        assert!(record.insert("基金类型", "混合型"));
        assert!(!record.insert("基金类型", "股票型"));
        assert_eq!(record.get("基金类型"), Some("混合型"));
        assert_eq!(record.get("基金经理人"), None);
        assert_eq!(record.fields.len(), 1);
    }
}
