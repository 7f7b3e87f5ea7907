use crate::build::BuildContext;
use crate::generator::{Generator, Requirement, RequirementContext};
use crate::properties::{explicit, generator_data, root_component_name};
use hookwright_data::{DataItem, PropertyDefinition};
use hookwright_render::{php_string, ClassMember, Docblock, PhpClass};
use hookwright_types::Result;
use indexmap::IndexMap;
use serde_json::json;

/// Directory and base class of each test type.
fn test_type_info(test_type: &str) -> (&'static str, &'static str) {
    match test_type {
        "unit" => ("Unit", "Drupal\\Tests\\UnitTestCase"),
        "functional" => ("Functional", "Drupal\\Tests\\BrowserTestBase"),
        "functional_javascript" => (
            "FunctionalJavascript",
            "Drupal\\FunctionalJavascriptTests\\WebDriverTestBase",
        ),
        _ => ("Kernel", "Drupal\\KernelTests\\KernelTestBase"),
    }
}

/// A PHPUnit test class, optionally with test fixture modules of its own.
#[derive(Debug)]
pub struct PhpUnitTest {
    data: DataItem,
}

impl PhpUnitTest {
    /// Properties.
    pub fn properties() -> Vec<PropertyDefinition> {
        vec![
            root_component_name(),
            PropertyDefinition::string("test_class_name")
                .label("Test class name")
                .required()
                .validator(|value| match value.as_str() {
                    Some(name) if name.ends_with("Test") => Ok(()),
                    _ => Err(format!("{} must end in 'Test'", value)),
                }),
            PropertyDefinition::string("test_type")
                .options([
                    ("unit", "Unit test"),
                    ("kernel", "Kernel test"),
                    ("functional", "Functional test"),
                    ("functional_javascript", "Functional JavaScript test"),
                ])
                .default_value(json!("kernel")),
            PropertyDefinition::complex("test_modules")
                .label("Test modules")
                .multiple()
                .component("test_module"),
        ]
    }

    /// Factory.
    pub fn create(data: DataItem) -> Box<dyn Generator> {
        Box::new(Self { data })
    }

    fn fixture_modules(&self) -> Vec<String> {
        self.data
            .get("test_modules")
            .map(|list| list.items().iter().map(|m| m.string_of("root_name")).collect())
            .unwrap_or_default()
    }
}

impl Generator for PhpUnitTest {
    generator_data!("phpunit_test");

    fn discriminator(&self) -> Option<String> {
        Some(self.data.string_of("test_class_name"))
    }

    fn required_components(&self, _ctx: &RequirementContext<'_>) -> Result<IndexMap<String, Requirement>> {
        let mut requirements = IndexMap::new();
        requirements.insert(
            "test_modules".to_string(),
            Requirement::each_record("test_module", explicit(&self.data, "test_modules")),
        );
        Ok(requirements)
    }

    fn contribute(&self, ctx: &mut BuildContext<'_>) -> Result<()> {
        let root = ctx.root_name()?;
        let test_type = self.data.string_of("test_type");
        let (directory, base_class) = test_type_info(&test_type);
        let class_name = self.data.string_of("test_class_name");

        let mut class = PhpClass::new(format!("Drupal\\Tests\\{}\\{}", root, directory), class_name.clone());
        class.docblock = ctx
            .docblock(format!("Tests the {} module.", ctx.root_label()?))
            .tag("group", root.clone());
        class.extends = Some(class.import(base_class));

        if test_type != "unit" {
            let mut modules = vec![root.clone()];
            modules.extend(self.fixture_modules());
            let list: Vec<String> = modules.iter().map(|m| php_string(m)).collect();
            class.add_member(ClassMember::property(
                "modules",
                Docblock::new("{@inheritdoc}"),
                &format!("protected static $modules = [{}]", list.join(", ")),
            ));
        }
        if test_type.starts_with("functional") {
            class.add_member(ClassMember::property(
                "defaultTheme",
                Docblock::new("{@inheritdoc}"),
                "protected $defaultTheme = 'stark'",
            ));
        }
        class.add_member(ClassMember::method(
            "testExample",
            Docblock::new("Tests basic functionality."),
            "public function testExample()",
            &["$this->assertTrue(TRUE);".to_string()],
        ));

        ctx.declare_class(&format!("tests/src/{}/{}.php", directory, class_name), class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::ComponentScope;
    use crate::metadata::StaticMetadata;
    use hookwright_render::PhpScanner;
    use hookwright_types::{ComponentId, GeneratorConfig};
    use std::sync::Arc;

    #[test]
    fn test_kernel_test_lists_fixture_modules() {
        let test_module = PropertyDefinition::complex("test_modules")
            .multiple()
            .property(PropertyDefinition::string("root_name"));
        let mut properties = PhpUnitTest::properties();
        properties.pop();
        properties.push(test_module);

        let mut item = DataItem::new(Arc::new(PropertyDefinition::root("phpunit_test", properties)));
        item.set(json!({
            "test_class_name": "AlphaTest",
            "test_modules": [{"root_name": "alpha_fixture"}],
        }))
        .unwrap();
        item.apply_defaults().unwrap();
        let test = PhpUnitTest::create(item);

        let metadata = StaticMetadata::builtin().unwrap();
        let config = GeneratorConfig::default();
        let scanner = PhpScanner::new().unwrap();
        let requirements = test
            .required_components(&RequirementContext {
                metadata: &metadata,
                config: &config,
                root_name: "test_module",
            })
            .unwrap();
        assert_eq!(requirements["test_modules"].occurrences()[0].1, json!({"root_name": "alpha_fixture"}));

        let mut ctx = BuildContext::new(&config, &metadata, &scanner);
        ctx.enter(ComponentScope {
            id: ComponentId::new("phpunit_test", "test_module", Some("AlphaTest")),
            base_path: String::new(),
            root_name: "test_module".to_string(),
            root_label: "Test module".to_string(),
        });
        test.contribute(&mut ctx).unwrap();

        let text = ctx.artifacts()["tests/src/Kernel/AlphaTest.php"].render(&config);
        assert!(text.contains("namespace Drupal\\Tests\\test_module\\Kernel;"));
        assert!(text.contains(" * @group test_module\n */\nclass AlphaTest extends KernelTestBase {"));
        assert!(text.contains("  protected static $modules = ['test_module', 'alpha_fixture'];"));
        assert!(!text.contains("defaultTheme"));
    }
}
