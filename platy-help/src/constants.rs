//! Fixed strings shared by the importers and the Markdown writers.

pub const YML_HEADER: &str = "---";
pub const SCHEMA_VERSION_YML: &str = "schema: 2.0.0";

pub const SYNOPSIS_MD_HEADER: &str = "## SYNOPSIS";
pub const SYNTAX_MD_HEADER: &str = "## SYNTAX";
pub const DESCRIPTION_MD_HEADER: &str = "## DESCRIPTION";
pub const EXAMPLES_MD_HEADER: &str = "## EXAMPLES";
pub const PARAMETERS_MD_HEADER: &str = "## PARAMETERS";
pub const INPUTS_MD_HEADER: &str = "## INPUTS";
pub const OUTPUTS_MD_HEADER: &str = "## OUTPUTS";
pub const NOTES_MD_HEADER: &str = "## NOTES";
pub const RELATED_LINKS_MD_HEADER: &str = "## RELATED LINKS";

pub const FILL_IN_SYNOPSIS: &str = "{{ Fill in the Synopsis }}";
pub const FILL_IN_DESCRIPTION: &str = "{{ Fill in the Description }}";
pub const FILL_IN_NOTES: &str = "{{ Fill in the Notes }}";
pub const FILL_IN_EXAMPLE_TITLE: &str = "{{ Add example title here }}";
pub const FILL_IN_EXAMPLE_CODE: &str = r"PS C:\> {{ Add example code here }}";
pub const FILL_IN_EXAMPLE_DESCRIPTION: &str = "{{ Add example description here }}";
pub const FILL_IN_RELATED_LINKS: &str = "{{ Fill Related Links Here }}";
pub const FILL_IN_GUID: &str = "{{ Fill in the Guid }}";
pub const FILL_DOWNLOAD_HELP_LINK: &str = "{{ Update Download Link }}";
pub const FILL_HELP_VERSION: &str = "{{ Please enter version of help manually (X.X.X.X) format }}";

pub fn fill_in_parameter_description(name: &str) -> String {
    format!("{{{{ Fill {} Description }}}}", name)
}

pub const NONE_STRING: &str = "None";
pub const NAMED_STRING: &str = "named";
pub const TRUE_STRING: &str = "true";
pub const SYSTEM_OBJECT_TYPENAME: &str = "System.Object";
pub const ALL_PARAMETER_SETS: &str = "__AllParameterSets";
pub const DEFAULT_LOCALE: &str = "en-US";
pub const MARKDOWN_EXTENSION: &str = "md";
pub const MAML_FILE_SUFFIX: &str = "-help.xml";

pub const COMMON_PARAMETERS: &str = "### CommonParameters

This cmdlet supports the common parameters: -Debug, -ErrorAction, -ErrorVariable, -InformationAction, -InformationVariable, -OutVariable, -OutBuffer, -PipelineVariable, -Verbose, -WarningAction, and -WarningVariable. For more information, see [about_CommonParameters](http://go.microsoft.com/fwlink/?LinkID=113216).";

// MAML element local names
pub const MAML_COMMAND_TAG: &str = "command";
pub const MAML_DETAILS_TAG: &str = "details";
pub const MAML_NAME_TAG: &str = "name";
pub const MAML_DESCRIPTION_TAG: &str = "description";
pub const MAML_PARA_TAG: &str = "para";
pub const MAML_SYNTAX_TAG: &str = "syntax";
pub const MAML_SYNTAX_ITEM_TAG: &str = "syntaxItem";
pub const MAML_PARAMETERS_TAG: &str = "parameters";
pub const MAML_PARAMETER_TAG: &str = "parameter";
pub const MAML_PARAMETER_VALUE_GROUP_TAG: &str = "parameterValueGroup";
pub const MAML_PARAMETER_VALUE_TAG: &str = "parameterValue";
pub const MAML_TYPE_TAG: &str = "type";
pub const MAML_DEFAULT_VALUE_TAG: &str = "defaultValue";
pub const MAML_INPUT_TYPES_TAG: &str = "inputTypes";
pub const MAML_INPUT_TYPE_TAG: &str = "inputType";
pub const MAML_RETURN_VALUES_TAG: &str = "returnValues";
pub const MAML_RETURN_VALUE_TAG: &str = "returnValue";
pub const MAML_ALERT_SET_TAG: &str = "alertSet";
pub const MAML_ALERT_TAG: &str = "alert";
pub const MAML_EXAMPLES_TAG: &str = "examples";
pub const MAML_EXAMPLE_TAG: &str = "example";
pub const MAML_TITLE_TAG: &str = "title";
pub const MAML_CODE_TAG: &str = "code";
pub const MAML_REMARKS_TAG: &str = "remarks";
pub const MAML_RELATED_LINKS_TAG: &str = "relatedLinks";
pub const MAML_NAVIGATION_LINK_TAG: &str = "navigationLink";
pub const MAML_LINK_TEXT_TAG: &str = "linkText";
pub const MAML_URI_TAG: &str = "uri";
