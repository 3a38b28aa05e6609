mod artifact;
mod resolver;

pub use artifact::MavenCoordinate;
pub use resolver::DependencyResolver;
