/// Verified caller identity extracted from a bearer token.
///
/// Populated by the JWT middleware before routing; handlers never touch
/// raw tokens. `groups` carries identity-provider group memberships.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub sub: String,
    pub email: Option<String>,
    pub groups: Vec<String>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.groups.iter().any(|g| g == "Admin")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_requires_admin_group() {
        let user = AuthUser {
            sub: "u1".to_string(),
            email: None,
            groups: vec!["Users".to_string()],
        };
        assert!(!user.is_admin());

        let admin = AuthUser {
            groups: vec!["Admin".to_string()],
            ..user
        };
        assert!(admin.is_admin());
    }
}
