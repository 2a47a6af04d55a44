pub mod asteroids;
pub mod composer;
pub mod dust;
pub mod flare;
pub mod rng;
pub mod skybox;
