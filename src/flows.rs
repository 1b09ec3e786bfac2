//! Built-in signup flows for the platform clients.
//!
//! Field names here are the wire names: they double as storage keys inside
//! step payloads and as top-level keys in the final submission body.

use crate::error::FlowError;
use crate::schema::{FieldRule, FlowSchema, Role, StepSchema};

/// The 25 administrative districts selectable at signup.
pub const DISTRICTS: &[&str] = &[
    "Ampara",
    "Anuradhapura",
    "Badulla",
    "Batticaloa",
    "Colombo",
    "Galle",
    "Gampaha",
    "Hambantota",
    "Jaffna",
    "Kalutara",
    "Kandy",
    "Kegalle",
    "Kilinochchi",
    "Kurunegala",
    "Mannar",
    "Matale",
    "Matara",
    "Monaragala",
    "Mullaitivu",
    "Nuwara Eliya",
    "Polonnaruwa",
    "Puttalam",
    "Ratnapura",
    "Trincomalee",
    "Vavuniya",
];

/// Specializations selectable on the doctor profile step.
pub const SPECIALIZATIONS: &[&str] = &[
    "Cardiology",
    "Dermatology",
    "Endocrinology",
    "Gastroenterology",
    "General Medicine",
    "Neurology",
    "Oncology",
    "Ophthalmology",
    "Orthopedics",
    "Pediatrics",
    "Psychiatry",
    "Radiology",
    "Surgery",
];

/// Relationship options for the patient emergency contact step.
pub const RELATIONSHIPS: &[&str] = &["Spouse", "Parent", "Child", "Sibling", "Guardian", "Other"];

/// Doctor signup: professional profile, then contact details.
pub fn doctor_signup() -> FlowSchema {
    FlowSchema::new(
        "doctorSignup",
        Role::Doctor,
        vec![
            StepSchema::new(
                "profile",
                vec![
                    FieldRule::text("fullName").with_min_length(2),
                    FieldRule::text("nameWithInitials").with_min_length(2),
                    FieldRule::text("slmcRegistrationNumber").with_min_length(3),
                    FieldRule::one_of("specialization", SPECIALIZATIONS),
                ],
            ),
            StepSchema::new(
                "contact",
                vec![
                    FieldRule::text("mobileNumber").with_min_length(10),
                    FieldRule::email("email"),
                    FieldRule::one_of("district", DISTRICTS),
                ],
            ),
        ],
    )
    .expect("built-in doctor flow is valid")
}

/// Patient signup: personal profile, contact details, then an emergency
/// contact.
pub fn patient_signup() -> FlowSchema {
    FlowSchema::new(
        "patientSignup",
        Role::Patient,
        vec![
            StepSchema::new(
                "profile",
                vec![
                    FieldRule::text("fullName").with_min_length(2),
                    FieldRule::text("nameWithInitials").with_min_length(2),
                    // National identity card number.
                    FieldRule::text("nic").with_min_length(10),
                ],
            ),
            StepSchema::new(
                "contact",
                vec![
                    FieldRule::text("mobileNumber").with_min_length(10),
                    FieldRule::email("email"),
                    FieldRule::one_of("district", DISTRICTS),
                    FieldRule::text("address").optional(),
                ],
            ),
            StepSchema::new(
                "emergency",
                vec![
                    FieldRule::text("emergencyContactName").with_min_length(2),
                    FieldRule::text("emergencyContactNumber").with_min_length(10),
                    FieldRule::one_of("relationship", RELATIONSHIPS),
                ],
            ),
        ],
    )
    .expect("built-in patient flow is valid")
}

/// Look up a built-in flow by name.
pub fn by_name(name: &str) -> Result<FlowSchema, FlowError> {
    match name {
        "doctorSignup" => Ok(doctor_signup()),
        "patientSignup" => Ok(patient_signup()),
        _ => Err(FlowError::UnknownFlow(name.to_string())),
    }
}
