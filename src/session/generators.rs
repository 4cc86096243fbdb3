use async_trait::async_trait;

/// Trait for generating display names for anonymous sessions
#[async_trait]
pub trait UsernameGenerator: Send + Sync {
    async fn generate(&self) -> String;
}

/// Pet name-based username generator, e.g. "guest-happy-cat"
pub struct PetNameUsernameGenerator;

impl PetNameUsernameGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PetNameUsernameGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UsernameGenerator for PetNameUsernameGenerator {
    async fn generate(&self) -> String {
        format!("guest-{}", petname::Petnames::default().generate_one(2, "-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_petname_username_generator() {
        let generator = PetNameUsernameGenerator::new();
        let username = generator.generate().await;

        let parts: Vec<&str> = username.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "guest");
        assert!(parts.iter().all(|part| !part.is_empty()));
    }
}
