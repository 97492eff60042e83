mod file_sink;
mod mapped_input;
mod output_dir;

pub use file_sink::{DEFAULT_MAX_BLOCKS, FileSink, block_file_name};
pub use mapped_input::MappedInput;
pub use output_dir::prepare_output_dir;
