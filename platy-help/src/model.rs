use crate::constants;
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

/// Help content for a single command
#[derive(Debug, Clone, PartialEq)]
pub struct CommandHelp {
    /// Full name of the command, eg. Get-Something
    pub title: String,

    /// Module the command came from
    pub module_name: String,

    /// Culture name of the help content, eg. en-US
    pub locale: String,

    pub module_guid: Option<Uuid>,

    /// Short one paragraph summary
    pub synopsis: String,

    /// Full description, paragraphs separated by blank lines
    pub description: String,

    pub notes: String,

    syntax: Vec<SyntaxItem>,
    examples: Vec<Example>,
    parameters: Vec<Parameter>,
    inputs: Vec<InputOutput>,
    outputs: Vec<InputOutput>,
    related_links: Vec<Link>,
}

impl Default for CommandHelp {
    fn default() -> Self {
        CommandHelp {
            title: String::new(),
            module_name: String::new(),
            locale: constants::DEFAULT_LOCALE.to_string(),
            module_guid: None,
            synopsis: String::new(),
            description: String::new(),
            notes: String::new(),
            syntax: Vec::new(),
            examples: Vec::new(),
            parameters: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            related_links: Vec::new(),
        }
    }
}

impl CommandHelp {
    pub fn new(title: impl Into<String>, module_name: impl Into<String>) -> Self {
        CommandHelp {
            title: title.into(),
            module_name: module_name.into(),
            ..Default::default()
        }
    }

    pub fn syntax(&self) -> &[SyntaxItem] {
        &self.syntax
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn inputs(&self) -> &[InputOutput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[InputOutput] {
        &self.outputs
    }

    pub fn related_links(&self) -> &[Link] {
        &self.related_links
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn add_syntax_item(&mut self, item: SyntaxItem) {
        self.syntax.push(item);
    }

    pub fn add_syntax_item_range<I: IntoIterator<Item = SyntaxItem>>(&mut self, items: I) {
        self.syntax.extend(items);
    }

    pub fn add_example(&mut self, example: Example) {
        self.examples.push(example);
    }

    pub fn add_example_range<I: IntoIterator<Item = Example>>(&mut self, examples: I) {
        self.examples.extend(examples);
    }

    /// Appends a parameter unless one with the same (case-insensitive) name
    /// already exists, in which case the first one is kept and `false` is returned.
    pub fn add_parameter(&mut self, parameter: Parameter) -> bool {
        if self.parameter(&parameter.name).is_some() {
            return false;
        }
        self.parameters.push(parameter);
        true
    }

    pub fn add_parameter_range<I: IntoIterator<Item = Parameter>>(&mut self, parameters: I) {
        for parameter in parameters {
            if !self.add_parameter(parameter) {
                log::debug!("{}: ignoring duplicate parameter", self.title);
            }
        }
    }

    pub fn add_input(&mut self, input: InputOutput) {
        self.inputs.push(input);
    }

    pub fn add_output(&mut self, output: InputOutput) {
        self.outputs.push(output);
    }

    pub fn add_related_link(&mut self, link: Link) {
        self.related_links.push(link);
    }

    pub fn add_related_link_range<I: IntoIterator<Item = Link>>(&mut self, links: I) {
        self.related_links.extend(links);
    }

    /// Appends every syntax item parameter that is not yet in the top-level list.
    pub(crate) fn backfill_parameters_from_syntax(&mut self) {
        let missing: Vec<Parameter> = self
            .syntax
            .iter()
            .flat_map(|item| item.parameters.iter())
            .filter(|p| self.parameter(&p.name).is_none())
            .cloned()
            .collect();
        self.add_parameter_range(missing);
    }
}

/// One invocation signature of a command, for a single parameter set
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxItem {
    pub command_name: String,
    pub parameter_set_name: Option<String>,
    pub is_default_parameter_set: bool,
    parameters: Vec<Parameter>,
}

impl SyntaxItem {
    pub fn new(
        command_name: impl Into<String>,
        parameter_set_name: Option<String>,
        is_default_parameter_set: bool,
    ) -> Self {
        SyntaxItem {
            command_name: command_name.into(),
            parameter_set_name,
            is_default_parameter_set,
            parameters: Vec::new(),
        }
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn add_parameter(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Named,
    Index(u32),
}

impl Position {
    /// Converts a host position, where any negative value means "named".
    pub fn from_host(position: Option<i64>) -> Self {
        match position {
            Some(p) if p >= 0 => u32::try_from(p).map_or(Position::Named, Position::Index),
            _ => Position::Named,
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Named => f.write_str(constants::NAMED_STRING),
            Position::Index(i) => i.fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPosition(pub String);

impl Display for InvalidPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("'{}' is not 'named' or a position", self.0))
    }
}

impl std::error::Error for InvalidPosition {}

impl FromStr for Position {
    type Err = InvalidPosition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(constants::NAMED_STRING) {
            return Ok(Position::Named);
        }
        s.parse::<u32>()
            .map(Position::Index)
            .map_err(|_| InvalidPosition(s.to_string()))
    }
}

/// Type of a parameter as far as it could be determined
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterType {
    /// Full type name, eg. System.String
    Resolved(String),
    /// A name found in the source that matched no known type; treated as unset
    Unresolved(String),
}

impl ParameterType {
    pub fn resolved_name(&self) -> Option<&str> {
        match self {
            ParameterType::Resolved(name) => Some(name),
            ParameterType::Unresolved(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parameter {
    pub name: String,
    pub parameter_type: Option<ParameterType>,
    pub description: String,
    pub default_value: Option<String>,
    pub aliases: Vec<String>,
    pub required: bool,
    pub position: Position,
    pub pipeline_input: bool,
    pub globbing: bool,
    pub dont_show: bool,
    pub variable_length: bool,
    parameter_sets: Vec<String>,
    required_parameter_sets: Vec<String>,
    accepted_values: Vec<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Parameter {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Resolved type name, if any
    pub fn type_name(&self) -> Option<&str> {
        self.parameter_type
            .as_ref()
            .and_then(ParameterType::resolved_name)
    }

    pub fn is_switch(&self) -> bool {
        self.type_name()
            .map(|t| t.ends_with("SwitchParameter"))
            .unwrap_or(false)
    }

    pub fn parameter_sets(&self) -> &[String] {
        &self.parameter_sets
    }

    pub fn required_parameter_sets(&self) -> &[String] {
        &self.required_parameter_sets
    }

    pub fn accepted_values(&self) -> &[String] {
        &self.accepted_values
    }

    pub fn add_parameter_set(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.parameter_sets.contains(&name) {
            self.parameter_sets.push(name);
        }
    }

    pub fn add_parameter_sets_range<I>(&mut self, names: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for name in names {
            self.add_parameter_set(name);
        }
    }

    /// Records that the parameter is mandatory in `name`; a mandatory set is
    /// always also a member set.
    pub fn add_required_parameter_set(&mut self, is_mandatory: bool, name: impl Into<String>) {
        let name = name.into();
        if !is_mandatory {
            return;
        }
        self.add_parameter_set(name.clone());
        if !self.required_parameter_sets.contains(&name) {
            self.required_parameter_sets.push(name);
        }
    }

    pub fn add_accepted_value(&mut self, value: impl Into<String>) {
        self.accepted_values.push(value.into());
    }

    pub fn add_accepted_values<I>(&mut self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.accepted_values
            .extend(values.into_iter().map(Into::into));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Example {
    pub title: String,
    pub code: String,
    pub remarks: String,
}

impl Example {
    pub fn new(
        title: impl Into<String>,
        code: impl Into<String>,
        remarks: impl Into<String>,
    ) -> Self {
        Example {
            title: title.into(),
            code: code.into(),
            remarks: remarks.into(),
        }
    }
}

/// Types a command accepts from, or writes to, the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputOutput {
    items: Vec<(String, String)>,
}

impl InputOutput {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn items(&self) -> &[(String, String)] {
        &self.items
    }

    pub fn add_input_output_item(
        &mut self,
        type_name: impl Into<String>,
        description: impl Into<String>,
    ) {
        self.items.push((type_name.into(), description.into()));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Link {
    pub uri: String,
    pub link_text: String,
}

impl Link {
    pub fn new(uri: impl Into<String>, link_text: impl Into<String>) -> Self {
        Link {
            uri: uri.into(),
            link_text: link_text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_parameter_names_keep_the_first() {
        let mut help = CommandHelp::new("Get-Foo", "FooModule");
        let mut first = Parameter::new("Name");
        first.description = "first".to_string();
        let mut second = Parameter::new("name");
        second.description = "second".to_string();

        assert!(help.add_parameter(first));
        assert!(!help.add_parameter(second));
        assert_eq!(help.parameters().len(), 1);
        assert_eq!(help.parameters()[0].description, "first");
    }

    #[test]
    fn mandatory_set_implies_membership() {
        let mut param = Parameter::new("Path");
        param.add_required_parameter_set(true, "ByPath");
        param.add_required_parameter_set(false, "ByLiteralPath");
        param.add_parameter_set("ByPath");

        assert_eq!(param.parameter_sets(), &["ByPath".to_string()]);
        assert_eq!(param.required_parameter_sets(), &["ByPath".to_string()]);
    }

    #[test]
    fn position_parsing() {
        assert_eq!("named".parse::<Position>(), Ok(Position::Named));
        assert_eq!("Named".parse::<Position>(), Ok(Position::Named));
        assert_eq!(" 2 ".parse::<Position>(), Ok(Position::Index(2)));
        assert!("-1".parse::<Position>().is_err());
        assert!("first".parse::<Position>().is_err());

        assert_eq!(Position::from_host(Some(i64::from(i32::MIN))), Position::Named);
        assert_eq!(Position::from_host(None), Position::Named);
        assert_eq!(Position::from_host(Some(1)), Position::Index(1));
        assert_eq!(Position::Index(3).to_string(), "3");
        assert_eq!(Position::Named.to_string(), "named");
    }

    #[test]
    fn unresolved_type_counts_as_unset() {
        let mut param = Parameter::new("Thing");
        param.parameter_type = Some(ParameterType::Unresolved("Contoso.Widget".to_string()));
        assert_eq!(param.type_name(), None);

        param.parameter_type = Some(ParameterType::Resolved(
            "System.Management.Automation.SwitchParameter".to_string(),
        ));
        assert!(param.is_switch());
    }

    #[test]
    fn backfill_adds_syntax_only_parameters() {
        let mut help = CommandHelp::new("Get-Foo", "FooModule");
        help.add_parameter(Parameter::new("Name"));
        let mut item = SyntaxItem::new("Get-Foo", None, false);
        item.add_parameter(Parameter::new("Name"));
        item.add_parameter(Parameter::new("Force"));
        help.add_syntax_item(item);

        help.backfill_parameters_from_syntax();

        let names: Vec<_> = help.parameters().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Name", "Force"]);
    }
}
