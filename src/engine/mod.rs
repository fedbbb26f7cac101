pub mod confetti;
pub mod normalize;
pub mod template;
