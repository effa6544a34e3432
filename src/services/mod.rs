pub mod posters;
pub mod providers;
pub mod recommendations;
pub mod recommender;

pub use posters::PosterResolver;
pub use recommender::Recommender;
