use uuid::Uuid;

pub type Id = String;

/// Placeholder shown in the report wherever a value is missing
pub const NOT_AVAILABLE: &str = "N/A";

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}
