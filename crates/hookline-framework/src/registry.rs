//! Plugin registration.
//!
//! The registry owns every loaded plugin, keeps callable names unique, and in
//! test mode compiles each plugin's examples into runnable cases.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::callable::Callable;
use crate::error::{PluginError, PluginResult};
use crate::example::{ExampleCase, ExampleFixture, ExampleRecord};
use crate::plugin::{HOOKLINE_PLUGIN_API_VERSION, Plugin, PluginDescriptor};

/// How registered plugins will be used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegistrationMode {
    /// Normal operation. Examples are kept for help output only.
    #[default]
    Runtime,
    /// Examples with expected results are compiled into test cases.
    Test,
}

/// Help information for one command-bearing callable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpEntry {
    /// Owning plugin.
    pub plugin: String,
    /// The primary command name.
    pub command: String,
    /// Other command names the callable answers to.
    pub aliases: Vec<String>,
    /// Examples to show.
    pub examples: Vec<ExampleRecord>,
}

impl HelpEntry {
    fn for_callable(plugin: &str, callable: &Callable) -> Option<Self> {
        let meta = callable.meta();
        let mut names = meta
            .commands
            .iter()
            .chain(&meta.nickname_commands)
            .chain(&meta.action_commands)
            .cloned();
        let command = names.next()?;
        let aliases = names.collect();

        let flagged: Vec<_> = meta.example.iter().filter(|e| e.help).cloned().collect();
        let examples = if flagged.is_empty() {
            meta.example.clone()
        } else {
            flagged
        };

        Some(Self {
            plugin: plugin.to_string(),
            command,
            aliases,
            examples,
        })
    }
}

/// The set of loaded plugins.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    mode: RegistrationMode,
    plugins: Vec<Arc<Plugin>>,
    // callable name -> owning plugin
    owners: HashMap<String, &'static str>,
    cases: Vec<ExampleCase>,
    fixtures: Vec<ExampleFixture>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new(mode: RegistrationMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// The registration mode.
    pub fn mode(&self) -> RegistrationMode {
        self.mode
    }

    /// Instantiates and registers a plugin.
    ///
    /// Nothing is registered if any step fails.
    ///
    /// # Errors
    ///
    /// - [`PluginError::IncompatibleApi`] if the descriptor targets another
    ///   framework API version.
    /// - [`PluginError::Pattern`] if a URL pattern fails to compile.
    /// - [`PluginError::DuplicateCallable`] if a callable name is taken.
    /// - [`PluginError::AnonymousCallable`] if a closure was left unnamed.
    /// - [`PluginError::Example`] in test mode, if an example fails to compile.
    pub fn register(&mut self, descriptor: &PluginDescriptor) -> PluginResult<Arc<Plugin>> {
        if !descriptor.is_compatible() {
            return Err(PluginError::IncompatibleApi {
                plugin: descriptor.name,
                found: descriptor.api_version,
                expected: HOOKLINE_PLUGIN_API_VERSION,
            });
        }

        let plugin = descriptor.instantiate()?;

        let mut seen: HashMap<&str, &'static str> = HashMap::new();
        for callable in plugin.callables() {
            let name = callable.name();
            if name.contains("{{closure}}") {
                return Err(PluginError::AnonymousCallable {
                    plugin: plugin.name().to_string(),
                });
            }
            let first = self
                .owners
                .get(name)
                .or_else(|| seen.get(name))
                .copied();
            if let Some(first) = first {
                return Err(PluginError::DuplicateCallable {
                    callable: name.to_string(),
                    first: first.to_string(),
                    second: plugin.name().to_string(),
                });
            }
            seen.insert(name, plugin.name());
        }

        let (cases, fixtures) = match self.mode {
            RegistrationMode::Runtime => (Vec::new(), Vec::new()),
            RegistrationMode::Test => compile_examples(&plugin)?,
        };

        debug!(
            plugin = plugin.name(),
            callables = plugin.callables().len(),
            cases = cases.len(),
            "Registered plugin"
        );

        for callable in plugin.callables() {
            self.owners
                .insert(callable.name().to_string(), plugin.name());
        }
        self.cases.extend(cases);
        self.fixtures.extend(fixtures);

        let plugin = Arc::new(plugin);
        self.plugins.push(Arc::clone(&plugin));
        info!(
            plugin = plugin.name(),
            version = plugin.metadata().version,
            "Plugin loaded"
        );
        Ok(plugin)
    }

    /// Registers several plugins in order, stopping at the first failure.
    pub fn register_all<'a, I>(&mut self, descriptors: I) -> PluginResult<()>
    where
        I: IntoIterator<Item = &'a PluginDescriptor>,
    {
        for descriptor in descriptors {
            self.register(descriptor)?;
        }
        Ok(())
    }

    /// Loaded plugins, in registration order.
    pub fn plugins(&self) -> &[Arc<Plugin>] {
        &self.plugins
    }

    /// Looks up a plugin by name.
    pub fn plugin(&self, name: &str) -> Option<&Arc<Plugin>> {
        self.plugins.iter().find(|p| p.name() == name)
    }

    /// Every callable, with its owning plugin.
    pub fn callables(&self) -> impl Iterator<Item = (&Arc<Plugin>, &Arc<Callable>)> {
        self.plugins
            .iter()
            .flat_map(|p| p.callables().iter().map(move |c| (p, c)))
    }

    /// Looks up a callable by name.
    pub fn callable(&self, name: &str) -> Option<&Arc<Callable>> {
        let plugin = self.owners.get(name)?;
        self.plugin(plugin)?.callable(name)
    }

    /// Compiled example cases. Always empty in runtime mode.
    pub fn cases(&self) -> &[ExampleCase] {
        &self.cases
    }

    /// Looks up the fixture for a callable.
    pub fn fixture(&self, callable: &str) -> Option<&ExampleFixture> {
        let name = ExampleFixture::for_callable(callable).name;
        self.fixtures.iter().find(|f| f.name == name)
    }

    /// Help entries for every callable with commands, in registration order.
    pub fn help_entries(&self) -> Vec<HelpEntry> {
        self.callables()
            .filter_map(|(p, c)| HelpEntry::for_callable(p.name(), c))
            .collect()
    }

    /// Help entries as pretty-printed JSON.
    pub fn help_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.help_entries())
    }
}

fn compile_examples(plugin: &Plugin) -> PluginResult<(Vec<ExampleCase>, Vec<ExampleFixture>)> {
    let mut cases = Vec::new();
    let mut fixtures = Vec::new();
    for callable in plugin.callables() {
        let mut index = 0;
        for example in callable.examples() {
            let compiled = ExampleCase::compile(
                plugin.name(),
                callable.name(),
                callable.meta(),
                index,
                example,
            )?;
            if let Some(case) = compiled {
                index += 1;
                cases.push(case);
            }
        }
        if index > 0 {
            fixtures.push(ExampleFixture::for_callable(callable.name()));
        }
    }
    Ok((cases, fixtures))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::define_plugin;
    use crate::example::Example;
    use crate::handle::BotHandle;
    use crate::plugin::PluginMetadata;

    async fn echo(bot: BotHandle) {
        let text = bot.trigger().group(2).unwrap_or_default().to_string();
        bot.say(&text);
    }

    async fn noop() {}

    static ECHO: PluginDescriptor = define_plugin! {
        name: "echo",
        callables: [
            Callable::new(echo)
                .commands(["echo", "repeat"])
                .example(Example::new(".echo hi").result("hi"))
                .example(Example::new(".echo"))
                .example(Example::new(".echo a b").result("a b").user_help()),
            Callable::new(noop).rule(["^hello"]),
        ],
    };

    static CLASH: PluginDescriptor = define_plugin! {
        name: "clash",
        callables: [Callable::new(echo).commands(["other"])],
    };

    static SELF_CLASH: PluginDescriptor = define_plugin! {
        name: "self_clash",
        callables: [
            Callable::named("twin", noop),
            Callable::named("twin", noop),
        ],
    };

    static CLOSURES: PluginDescriptor = define_plugin! {
        name: "closures",
        callables: [Callable::new(|| async {}).commands(["anon"])],
    };

    static NAMED_CLOSURES: PluginDescriptor = define_plugin! {
        name: "named_closures",
        callables: [
            Callable::named("first", || async {}).commands(["first"]),
            Callable::named("second", || async {}).commands(["second"]),
        ],
    };

    static NOT_A_COMMAND: PluginDescriptor = define_plugin! {
        name: "not_a_command",
        callables: [Callable::named("rule_only", noop)
            .rule(["^hi"])
            .example(Example::new("hi").result("hello"))],
    };

    fn future_api() -> Result<Plugin, crate::error::PatternError> {
        Ok(Plugin::__new("future", Vec::new(), None, FUTURE_META))
    }

    const FUTURE_META: PluginMetadata = PluginMetadata {
        version: "0.0.0",
        desc: "",
        full_desc: None,
    };

    static FUTURE: PluginDescriptor = PluginDescriptor {
        api_version: 0x0002_0000,
        name: "future",
        create: future_api,
        metadata: FUTURE_META,
    };

    #[test]
    fn test_runtime_mode_compiles_no_cases() {
        let mut registry = PluginRegistry::new(RegistrationMode::Runtime);
        registry.register(&ECHO).unwrap();
        assert!(registry.cases().is_empty());
        assert!(registry.callable("echo").is_some());
        assert!(registry.callable("noop").is_some());
    }

    #[test]
    fn test_test_mode_compiles_cases() {
        let mut registry = PluginRegistry::new(RegistrationMode::Test);
        registry.register(&ECHO).unwrap();
        let names: Vec<_> = registry.cases().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["test_example_echo_0", "test_example_echo_1"]);
        assert!(registry.fixture("echo").is_some());
        assert!(registry.fixture("noop").is_none());
    }

    #[test]
    fn test_unnamed_closure_rejected() {
        let mut registry = PluginRegistry::new(RegistrationMode::Runtime);
        let err = registry.register(&CLOSURES).unwrap_err();
        assert!(matches!(err, PluginError::AnonymousCallable { plugin } if plugin == "closures"));
        assert!(registry.plugins().is_empty());

        registry.register(&NAMED_CLOSURES).unwrap();
        assert!(registry.callable("first").is_some());
        assert!(registry.callable("second").is_some());
    }

    #[test]
    fn test_example_errors_only_in_test_mode() {
        let mut runtime = PluginRegistry::new(RegistrationMode::Runtime);
        assert!(runtime.register(&NOT_A_COMMAND).is_ok());

        let mut test = PluginRegistry::new(RegistrationMode::Test);
        let err = test.register(&NOT_A_COMMAND).unwrap_err();
        assert!(matches!(err, PluginError::Example(_)));
        assert!(test.plugins().is_empty());
    }

    #[test]
    fn test_duplicate_across_plugins() {
        let mut registry = PluginRegistry::new(RegistrationMode::Runtime);
        registry.register(&ECHO).unwrap();
        match registry.register(&CLASH).unwrap_err() {
            PluginError::DuplicateCallable {
                callable,
                first,
                second,
            } => {
                assert_eq!(callable, "echo");
                assert_eq!(first, "echo");
                assert_eq!(second, "clash");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(registry.plugins().len(), 1);
    }

    #[test]
    fn test_duplicate_within_plugin() {
        let mut registry = PluginRegistry::new(RegistrationMode::Runtime);
        assert!(matches!(
            registry.register(&SELF_CLASH),
            Err(PluginError::DuplicateCallable { .. })
        ));
        assert!(registry.callable("twin").is_none());
    }

    #[test]
    fn test_incompatible_api() {
        let mut registry = PluginRegistry::new(RegistrationMode::Runtime);
        assert!(matches!(
            registry.register(&FUTURE),
            Err(PluginError::IncompatibleApi { found: 0x0002_0000, .. })
        ));
    }

    #[test]
    fn test_help_entries() {
        let mut registry = PluginRegistry::new(RegistrationMode::Runtime);
        registry.register(&ECHO).unwrap();
        let help = registry.help_entries();
        assert_eq!(help.len(), 1);
        assert_eq!(help[0].command, "echo");
        assert_eq!(help[0].aliases, vec!["repeat"]);
        // Only the flagged example is shown.
        assert_eq!(help[0].examples.len(), 1);
        assert_eq!(help[0].examples[0].example, ".echo a b");

        let json = registry.help_json().unwrap();
        assert!(json.contains("\"command\": \"echo\""));
    }

    #[test]
    fn test_help_shows_all_examples_when_none_flagged() {
        let callable = Callable::new(echo)
            .commands(["echo"])
            .example(Example::new(".echo 1"))
            .example(Example::new(".echo 2"));
        let entry = HelpEntry::for_callable("p", &callable).unwrap();
        assert_eq!(entry.examples.len(), 2);
        assert!(HelpEntry::for_callable("p", &Callable::new(noop)).is_none());
    }
}
