pub mod dependency;
pub mod reader;

pub use dependency::{ShuffleDependency, ShuffleHandle};
pub use reader::{PostShuffleReader, ShuffleRowStream, ShuffleTransport};
