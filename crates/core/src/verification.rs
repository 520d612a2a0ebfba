//! Identity verification submission rules.

use crate::error::CoreError;

pub const VERIFICATION_PENDING: &str = "pending";
pub const VERIFICATION_APPROVED: &str = "approved";
pub const VERIFICATION_REJECTED: &str = "rejected";

pub const DOC_AADHAAR: &str = "aadhaar";
pub const DOC_PAN: &str = "pan";
pub const DOC_PASSPORT: &str = "passport";
pub const DOC_VOTER_ID: &str = "voter_id";

/// All accepted identity document types.
pub const VALID_DOCUMENT_TYPES: &[&str] = &[DOC_AADHAAR, DOC_PAN, DOC_PASSPORT, DOC_VOTER_ID];

/// Validate a document submission.
///
/// Aadhaar numbers are 12 digits (spaces allowed), PAN is 10 alphanumerics.
/// Other document types only need a non-empty number.
pub fn validate_document(document_type: &str, document_number: &str) -> Result<(), CoreError> {
    if !VALID_DOCUMENT_TYPES.contains(&document_type) {
        return Err(CoreError::Validation(format!(
            "Invalid document type '{document_type}'. Must be one of: {}",
            VALID_DOCUMENT_TYPES.join(", ")
        )));
    }

    let number: String = document_number.chars().filter(|c| !c.is_whitespace()).collect();
    if number.is_empty() {
        return Err(CoreError::Validation("document_number must not be empty".into()));
    }

    match document_type {
        DOC_AADHAAR if number.len() != 12 || !number.chars().all(|c| c.is_ascii_digit()) => Err(
            CoreError::Validation("Aadhaar number must be 12 digits".into()),
        ),
        DOC_PAN if number.len() != 10 || !number.chars().all(|c| c.is_ascii_alphanumeric()) => Err(
            CoreError::Validation("PAN must be 10 alphanumeric characters".into()),
        ),
        _ => Ok(()),
    }
}

/// Ensure a submission is still pending before it is reviewed.
pub fn ensure_reviewable(status: &str) -> Result<(), CoreError> {
    if status != VERIFICATION_PENDING {
        return Err(CoreError::Conflict(format!(
            "Verification is already {status}"
        )));
    }
    Ok(())
}

/// A rejection must say why.
pub fn validate_rejection_reason(reason: Option<&str>) -> Result<(), CoreError> {
    match reason {
        Some(r) if !r.trim().is_empty() => Ok(()),
        _ => Err(CoreError::Validation(
            "A rejection reason is required".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aadhaar_must_be_twelve_digits() {
        assert!(validate_document(DOC_AADHAAR, "1234 5678 9012").is_ok());
        assert!(validate_document(DOC_AADHAAR, "1234 5678").is_err());
        assert!(validate_document(DOC_AADHAAR, "1234 5678 90AB").is_err());
    }

    #[test]
    fn pan_must_be_ten_alphanumerics() {
        assert!(validate_document(DOC_PAN, "ABCDE1234F").is_ok());
        assert!(validate_document(DOC_PAN, "ABCDE-1234").is_err());
    }

    #[test]
    fn unknown_type_and_empty_number_rejected() {
        assert!(validate_document("driving_licence", "DL-01").is_err());
        assert!(validate_document(DOC_PASSPORT, "   ").is_err());
        assert!(validate_document(DOC_PASSPORT, "Z1234567").is_ok());
    }

    #[test]
    fn review_requires_pending_and_reason() {
        assert!(ensure_reviewable(VERIFICATION_PENDING).is_ok());
        assert!(ensure_reviewable(VERIFICATION_APPROVED).is_err());
        assert!(validate_rejection_reason(Some("Blurry scan")).is_ok());
        assert!(validate_rejection_reason(Some(" ")).is_err());
        assert!(validate_rejection_reason(None).is_err());
    }
}
