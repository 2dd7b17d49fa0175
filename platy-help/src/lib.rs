//! Converts PowerShell command help between host metadata, MAML XML and
//! Markdown pages.
//!
//! Importers (`transform_command`, `maml`, `markdown_reader`) produce
//! [`CommandHelp`] values; exporters (`markdown_writer`, `module_page`) turn
//! them into files.

pub mod constants;
pub mod error;
pub mod host;
pub mod maml;
pub mod markdown_reader;
pub mod markdown_writer;
pub mod model;
pub mod module_page;
pub mod transform_command;
pub mod types;

pub use error::PlatyError;
pub use host::{CommandHost, JsonHost};
pub use maml::{MamlBatch, MamlTransform};
pub use markdown_writer::{CommandHelpMarkdownWriter, WriterSettings};
pub use model::{
    CommandHelp, Example, InputOutput, Link, Parameter, ParameterType, Position, SyntaxItem,
};
pub use module_page::ModulePageWriter;
pub use transform_command::CommandTransform;
