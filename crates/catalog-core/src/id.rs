use uuid::Uuid;

/// Generates a fresh random (v4) product identity.
pub fn generate_id() -> Uuid {
    Uuid::new_v4()
}

/// Parses an identity from its canonical string form.
pub fn parse_id(raw: &str) -> Result<Uuid, uuid::Error> {
    Uuid::parse_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_are_unique() {
        let ids: HashSet<Uuid> = (0..1000).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn parse_roundtrips_canonical_form() {
        let id = generate_id();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
        assert!(parse_id("not-a-uuid").is_err());
    }
}
