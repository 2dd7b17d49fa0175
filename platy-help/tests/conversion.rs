use platy_help::markdown_writer::{render, sorted_parameters};
use platy_help::{
    markdown_reader, CommandHelp, CommandHelpMarkdownWriter, CommandTransform, JsonHost,
    MamlTransform, ModulePageWriter, PlatyError, Position, WriterSettings,
};
use serde_json::json;
use std::path::Path;

fn snapshot() -> JsonHost {
    JsonHost::from_json(json!({
        "Commands": [
            {
                "Name": "Get-Foo",
                "ModuleName": "FooModule",
                "ModuleGuid": "0b1e5e8f-3d7a-4c55-9a3e-6f7d8c9b0a1d",
                "Parameters": [
                    {
                        "Name": "Name",
                        "ParameterType": "System.String",
                        "Aliases": ["n"],
                        "ParameterSets": [{ "Name": "ByName", "IsMandatory": true }]
                    },
                    {
                        "Name": "Id",
                        "ParameterType": "System.Int32",
                        "ParameterSets": [{ "Name": "ById", "IsMandatory": true }]
                    },
                    {
                        "Name": "Force",
                        "ParameterType": "System.Management.Automation.SwitchParameter",
                        "ParameterSets": [{ "Name": "__AllParameterSets" }]
                    },
                    {
                        "Name": "Depth",
                        "ParameterType": "System.Int32",
                        "ParameterSets": [{ "Name": "__AllParameterSets" }]
                    }
                ],
                "ParameterSets": [
                    {
                        "Name": "ByName",
                        "IsDefault": true,
                        "Parameters": [
                            {
                                "Name": "Name",
                                "IsMandatory": true,
                                "Position": 0,
                                "ValueFromPipeline": true
                            },
                            { "Name": "Depth", "Position": 1 },
                            { "Name": "Force" }
                        ]
                    },
                    {
                        "Name": "ById",
                        "Parameters": [
                            { "Name": "Id", "IsMandatory": true },
                            { "Name": "Depth", "Position": 1 },
                            { "Name": "Force" }
                        ]
                    }
                ]
            },
            { "Name": "Set-Foo", "ModuleName": "FooModule" },
            { "Name": "Remove-Foo", "ModuleName": "FooModule" }
        ],
        "Help": {
            "Get-Foo": {
                "Synopsis": "Gets foo.",
                "description": [{ "Text": "Do this. Then that." }],
                "examples": {
                    "example": { "title": "Example 1: Get a foo", "code": "Get-Foo bar" }
                },
                "parameters": { "parameter": [
                    { "name": "Name", "description": [{ "Text": "The name." }] }
                ]}
            }
        }
    }))
    .unwrap()
}

fn get_foo() -> CommandHelp {
    CommandTransform::new(&snapshot())
        .transform(["Get-Foo"])
        .unwrap()
        .remove(0)
}

fn write_page(help: &CommandHelp, path: &Path) -> String {
    let settings = WriterSettings::new(path).unwrap();
    CommandHelpMarkdownWriter::new(settings, help).write().unwrap();
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn markdown_round_trip_keeps_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let help = get_foo();
    let path = dir.path().join("Get-Foo.md");
    write_page(&help, &path);

    let read = markdown_reader::read_file(&path).unwrap();
    assert_eq!(read.title, "Get-Foo");
    assert_eq!(read.module_name, "FooModule");
    assert_eq!(read.synopsis, "Gets foo.");

    let summary = |h: &CommandHelp| -> Vec<(String, bool, Position)> {
        sorted_parameters(h)
            .into_iter()
            .map(|p| (p.name.clone(), p.required, p.position))
            .collect()
    };
    assert_eq!(summary(&read), summary(&help));
    assert_eq!(
        summary(&read),
        vec![
            ("Depth".to_string(), false, Position::Index(1)),
            ("Force".to_string(), false, Position::Named),
            ("Id".to_string(), true, Position::Named),
            ("Name".to_string(), true, Position::Index(0)),
        ]
    );
    assert_eq!(read.syntax().len(), 2);
    assert_eq!(read.parameter("Name").unwrap().type_name(), Some("System.String"));
}

#[test]
fn export_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let help = get_foo();

    let first = write_page(&help, &dir.path().join("first.md"));
    let second = write_page(&help, &dir.path().join("first.md"));
    let other = write_page(&help, &dir.path().join("second.md"));

    assert_eq!(first, second);
    assert_eq!(first, other);
}

#[test]
fn export_sorts_a_copy() {
    let help = get_foo();
    let before: Vec<String> = help.parameters().iter().map(|p| p.name.clone()).collect();
    assert_eq!(before, vec!["Name", "Id", "Force", "Depth"]);

    let page = render(&help);
    let positions: Vec<usize> = ["### -Depth", "### -Force", "### -Id", "### -Name"]
        .iter()
        .map(|h| page.find(h).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    let after: Vec<String> = help.parameters().iter().map(|p| p.name.clone()).collect();
    assert_eq!(before, after);
}

#[test]
fn sentences_break_onto_lines() {
    let help = get_foo();
    assert_eq!(help.description, "Do this.\nThen that.");
    assert!(render(&help).contains("## DESCRIPTION\n\nDo this.\nThen that.\n\n## EXAMPLES"));
}

#[test]
fn module_page_lists_commands_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let commands = CommandTransform::new(&snapshot())
        .transform(["Get-Foo", "Set-Foo", "Remove-Foo"])
        .unwrap();

    let writer = ModulePageWriter::new(WriterSettings::new(dir.path().join("docs")).unwrap());
    let path = writer.write(&commands).unwrap();
    assert_eq!(path, dir.path().join("docs").join("FooModule.md"));

    let page = std::fs::read_to_string(path).unwrap();
    assert!(page.contains("Module Guid: 0b1e5e8f-3d7a-4c55-9a3e-6f7d8c9b0a1d\n"));
    assert!(page.contains(
        "## FooModule Cmdlets\n\n\
         ### [Get-Foo](Get-Foo.md)\n\n{{ Fill in the Description }}\n\n\
         ### [Set-Foo](Set-Foo.md)\n\n{{ Fill in the Description }}\n\n\
         ### [Remove-Foo](Remove-Foo.md)\n\n{{ Fill in the Description }}\n"
    ));
    assert_eq!(page.matches("### [").count(), 3);
}

const FOO_MAML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<helpItems schema="maml" xmlns="http://msh">
  <command:command xmlns:maml="http://schemas.microsoft.com/maml/2004/10" xmlns:command="http://schemas.microsoft.com/maml/dev/command/2004/10" xmlns:dev="http://schemas.microsoft.com/maml/dev/2004/10">
    <command:details>
      <command:name>Get-Foo</command:name>
      <maml:description><maml:para>Gets foo.</maml:para></maml:description>
    </command:details>
    <command:syntax>
      <command:syntaxItem>
        <maml:name>Get-Foo</maml:name>
        <command:parameter required="true" pipelineInput="True (ByPropertyName, ByValue)" position="0">
          <maml:name>Name</maml:name>
          <dev:type><maml:name>System.String</maml:name></dev:type>
        </command:parameter>
        <command:parameter pipelineInput="False" position="named">
          <maml:name>Force</maml:name>
        </command:parameter>
      </command:syntaxItem>
    </command:syntax>
  </command:command>
</helpItems>"#;

const BROKEN_MAML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<helpItems schema="maml" xmlns="http://msh">
  <command:command xmlns:command="http://schemas.microsoft.com/maml/dev/command/2004/10">
    <command:details></command:details>
  </command:command>
</helpItems>"#;

#[test]
fn maml_batch_keeps_good_documents() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("FooModule-help.xml");
    let broken = dir.path().join("Broken-help.xml");
    let empty = dir.path().join("Empty-help.xml");
    std::fs::write(&good, FOO_MAML).unwrap();
    std::fs::write(&broken, BROKEN_MAML).unwrap();
    std::fs::write(&empty, r#"<helpItems schema="maml"></helpItems>"#).unwrap();

    let batch = MamlTransform::new().transform([&broken, &good, &empty]).unwrap();

    assert_eq!(batch.commands.len(), 1);
    let help = &batch.commands[0];
    assert_eq!(help.title, "Get-Foo");
    assert_eq!(help.module_name, "FooModule");

    let name = help.parameter("Name").unwrap();
    assert!(name.required);
    assert!(name.pipeline_input);
    let force = help.parameter("Force").unwrap();
    assert!(!force.required);
    assert!(!force.pipeline_input);

    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].0, broken);
    assert!(PlatyError::is_structural(&batch.failures[0].1));
}

#[test]
fn maml_missing_file_fails_up_front() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("FooModule-help.xml");
    std::fs::write(&good, FOO_MAML).unwrap();

    let err = MamlTransform::new()
        .transform([good, dir.path().join("Missing-help.xml")])
        .unwrap_err();
    assert!(PlatyError::is_argument_invalid(&err));
}

#[test]
fn maml_to_markdown() {
    let dir = tempfile::tempdir().unwrap();
    let commands = MamlTransform::new()
        .with_module_name("Contoso")
        .read_maml(FOO_MAML.as_bytes(), "Contoso")
        .unwrap();

    let page = write_page(&commands[0], &dir.path().join("Get-Foo.md"));
    assert!(page.starts_with("---\nexternal help file: Contoso-help.xml\nModule Name: Contoso\n"));
    assert!(page.contains(
        "```\nGet-Foo [-Name] <String> [-Force <Object>] [<CommonParameters>]\n```"
    ));
    assert!(page.ends_with("## RELATED LINKS\n\n{{ Fill Related Links Here }}\n"));
}

fn syntax_summary(help: &CommandHelp) -> Vec<Vec<(String, bool, Position)>> {
    help.syntax()
        .iter()
        .map(|item| {
            let mut params: Vec<(String, bool, Position)> = item
                .parameters()
                .iter()
                .map(|p| (p.name.clone(), p.required, p.position))
                .collect();
            params.sort_by(|a, b| a.0.cmp(&b.0));
            params
        })
        .collect()
}

const WIDGET_MAML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<helpItems schema="maml" xmlns="http://msh">
  <command:command xmlns:maml="http://schemas.microsoft.com/maml/2004/10" xmlns:command="http://schemas.microsoft.com/maml/dev/command/2004/10" xmlns:dev="http://schemas.microsoft.com/maml/dev/2004/10">
    <command:details>
      <command:name>Get-Widget</command:name>
    </command:details>
    <command:syntax>
      <command:syntaxItem>
        <maml:name>Get-Widget</maml:name>
        <command:parameter required="true" position="0">
          <maml:name>Widget</maml:name>
          <dev:type><maml:name>Contoso.Widget</maml:name></dev:type>
        </command:parameter>
      </command:syntaxItem>
      <command:syntaxItem>
        <maml:name>Get-Widget</maml:name>
        <command:parameter required="true" position="named">
          <maml:name>Id</maml:name>
        </command:parameter>
      </command:syntaxItem>
    </command:syntax>
  </command:command>
</helpItems>"#;

#[test]
fn untyped_syntax_round_trips() {
    let help = MamlTransform::new()
        .read_maml(WIDGET_MAML.as_bytes(), "Contoso")
        .unwrap()
        .remove(0);

    let page = render(&help);
    assert!(page.contains(
        "### __AllParameterSets 1\n\n```\nGet-Widget [-Widget] <Object> [<CommonParameters>]\n```"
    ));
    assert!(page.contains(
        "### __AllParameterSets 2\n\n```\nGet-Widget -Id <Object> [<CommonParameters>]\n```"
    ));

    let read = markdown_reader::read_markdown(&page).unwrap();
    assert_eq!(syntax_summary(&read), syntax_summary(&help));
    assert_eq!(
        syntax_summary(&read)[0],
        vec![("Widget".to_string(), true, Position::Index(0))]
    );
    assert!(read.syntax().iter().all(|s| s.parameter_set_name.is_none()));
}

#[test]
fn per_set_positions_round_trip() {
    let host = JsonHost::from_json(json!({
        "Commands": [{
            "Name": "Get-Item",
            "ModuleName": "FooModule",
            "Parameters": [
                {
                    "Name": "Id",
                    "ParameterType": "System.Int32",
                    "ParameterSets": [
                        { "Name": "A", "IsMandatory": true },
                        { "Name": "B", "IsMandatory": true }
                    ]
                }
            ],
            "ParameterSets": [
                {
                    "Name": "A",
                    "IsDefault": true,
                    "Parameters": [{ "Name": "Id", "IsMandatory": true }]
                },
                {
                    "Name": "B",
                    "Parameters": [{ "Name": "Id", "IsMandatory": true, "Position": 0 }]
                }
            ]
        }]
    }))
    .unwrap();
    let help = CommandTransform::new(&host)
        .transform(["Get-Item"])
        .unwrap()
        .remove(0);

    let read = markdown_reader::read_markdown(&render(&help)).unwrap();
    assert_eq!(syntax_summary(&read), syntax_summary(&help));
    assert_eq!(
        syntax_summary(&read),
        vec![
            vec![("Id".to_string(), true, Position::Named)],
            vec![("Id".to_string(), true, Position::Index(0))],
        ]
    );
}
