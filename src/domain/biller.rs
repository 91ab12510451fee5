use serde::{Deserialize, Serialize};

/// A bill category the wallet can pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Biller {
    pub id: String,
    pub name: String,
    pub category: String,
}

impl Biller {
    fn new(id: &str, name: &str, category: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
        }
    }
}

/// The fixed biller catalogue.
pub fn default_billers() -> Vec<Biller> {
    vec![
        Biller::new("electricity", "Electricity Bill", "Utilities"),
        Biller::new("gas", "Gas Bill", "Utilities"),
        Biller::new("water", "Water Bill", "Utilities"),
        Biller::new("broadband", "Broadband", "Internet"),
        Biller::new("mobile", "Mobile Recharge", "Mobile"),
        Biller::new("insurance", "Insurance Premium", "Insurance"),
    ]
}

/// Look up a biller by id or (case-insensitive) name.
pub fn find_biller<'a>(billers: &'a [Biller], key: &str) -> Option<&'a Biller> {
    billers
        .iter()
        .find(|b| b.id.eq_ignore_ascii_case(key) || b.name.eq_ignore_ascii_case(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_biller() {
        let billers = default_billers();
        assert_eq!(billers.len(), 6);
        assert_eq!(find_biller(&billers, "GAS").map(|b| b.name.as_str()), Some("Gas Bill"));
        assert_eq!(
            find_biller(&billers, "mobile recharge").map(|b| b.id.as_str()),
            Some("mobile")
        );
        assert!(find_biller(&billers, "netflix").is_none());
    }
}
