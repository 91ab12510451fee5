use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type BeneficiaryId = String;

/// A saved recipient for bank transfers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiary {
    pub id: BeneficiaryId,
    pub name: String,
    pub account_number: String,
    /// Bank/branch code, see [`validate_routing_code`]
    pub routing_code: String,
    pub bank_name: String,
    /// New beneficiaries start unverified
    pub verified: bool,
}

/// Beneficiary details as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBeneficiary {
    pub name: String,
    pub account_number: String,
    pub routing_code: String,
    pub bank_name: String,
}

impl NewBeneficiary {
    pub fn new(
        name: impl Into<String>,
        account_number: impl Into<String>,
        routing_code: impl Into<String>,
        bank_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            account_number: account_number.into(),
            routing_code: routing_code.into(),
            bank_name: bank_name.into(),
        }
    }

    /// Assign a fresh id. Whatever the caller intended, the result is unverified.
    pub fn into_beneficiary(self) -> Beneficiary {
        Beneficiary {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            account_number: self.account_number,
            routing_code: self.routing_code,
            bank_name: self.bank_name,
            verified: false,
        }
    }
}

/// Routing codes are four letters, a literal '0', then six letters or digits.
/// Example: "SBIN0001234". Only upper case is accepted.
pub fn validate_routing_code(code: &str) -> bool {
    let bytes = code.as_bytes();
    bytes.len() == 11
        && bytes[..4].iter().all(u8::is_ascii_uppercase)
        && bytes[4] == b'0'
        && bytes[5..]
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_routing_codes() {
        assert!(validate_routing_code("SBIN0001234"));
        assert!(validate_routing_code("HDFC0000987"));
        assert!(validate_routing_code("ICIC0AB12CD"));
    }

    #[test]
    fn test_invalid_routing_codes() {
        assert!(!validate_routing_code(""));
        assert!(!validate_routing_code("sbin0001234")); // lower case
        assert!(!validate_routing_code("SBIN1001234")); // fifth char must be '0'
        assert!(!validate_routing_code("SBI00001234")); // digit in bank part
        assert!(!validate_routing_code("SBIN000123")); // too short
        assert!(!validate_routing_code("SBIN00012345")); // too long
        assert!(!validate_routing_code("SBIN000123-")); // punctuation
    }

    #[test]
    fn test_new_beneficiary_is_unverified() {
        let beneficiary =
            NewBeneficiary::new("Amit Verma", "5566778899", "ICIC0004321", "ICICI Bank")
                .into_beneficiary();

        assert!(!beneficiary.verified);
        assert_eq!(beneficiary.name, "Amit Verma");
        assert!(!beneficiary.id.is_empty());
    }
}
