// OAuth `state` token generation.

/// Length of generated state tokens.
pub const STATE_LENGTH: usize = 40;

/// Generate a random state token for an authorization request.
pub fn generate_state() -> String {
    nanoid::nanoid!(STATE_LENGTH)
}
