use crate::command::Command;
use std::collections::BTreeMap;

/// Constructor that produces a fresh command instance per invocation.
///
/// Boxed so registrations can be closures capturing whatever state the command
/// needs; nothing is cached between dispatches.
pub type CommandCtor = Box<dyn Fn() -> Box<dyn Command>>;

/// What a fully-qualified dotted path can point at in a [`ModuleRegistry`].
pub enum Symbol {
    /// A command constructor, the only kind of symbol the dispatcher can run.
    Command(CommandCtor),
    /// Any other registered value. Importable, but rejected by the type check.
    Opaque,
}

/// Outcome of loading one candidate path.
///
/// The resolver consumes these with an ordinary loop instead of catching
/// errors: a probe that misses is a value, not a failure. Only code acting on
/// behalf of an explicit override turns `NotFound`/`NotACommand` into an
/// [`Error`](crate::Error).
pub enum LoadOutcome {
    /// The path named a command constructor; here is a fresh instance.
    Loaded(Box<dyn Command>),
    /// Nothing is registered at the path.
    NotFound,
    /// The path resolves, but to a symbol that is not a command.
    NotACommand,
}

/// Injectable "import by dotted path" capability.
///
/// Stands in for the host framework's dynamic module loading so the resolution
/// algorithm can be exercised against a plain in-memory table.
pub trait CommandLoader {
    /// Load whatever is registered at `path` and type-check it.
    fn load(&self, path: &str) -> LoadOutcome;

    /// Names of the immediate submodules of `module`, in stable order.
    ///
    /// A module that does not exist simply has no submodules; that is not an
    /// error.
    fn submodules(&self, module: &str) -> Vec<String>;
}

/// In-memory symbol table keyed by fully-qualified dotted paths.
///
/// This is the default [`CommandLoader`]: the host (or a test) registers
/// command constructors under paths like `blog.commands.publish.Command`, and
/// resolution probes the table exactly as it would probe real modules.
#[derive(Default)]
pub struct ModuleRegistry {
    symbols: BTreeMap<String, Symbol>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with the framework's own commands under
    /// the `core` namespace.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtin::register_builtins(&mut registry);
        registry
    }

    /// Register a command constructor at `path`, replacing any previous symbol.
    pub fn register_command<F>(&mut self, path: impl Into<String>, ctor: F)
    where
        F: Fn() -> Box<dyn Command> + 'static,
    {
        self.symbols
            .insert(path.into(), Symbol::Command(Box::new(ctor)));
    }

    /// Register a non-command symbol at `path`.
    ///
    /// Useful to model a path that imports fine but fails the type check.
    pub fn register_opaque(&mut self, path: impl Into<String>) {
        self.symbols.insert(path.into(), Symbol::Opaque);
    }
}

impl CommandLoader for ModuleRegistry {
    fn load(&self, path: &str) -> LoadOutcome {
        match self.symbols.get(path) {
            Some(Symbol::Command(ctor)) => LoadOutcome::Loaded(ctor()),
            Some(Symbol::Opaque) => LoadOutcome::NotACommand,
            None => LoadOutcome::NotFound,
        }
    }

    fn submodules(&self, module: &str) -> Vec<String> {
        let prefix = format!("{module}.");
        let mut names: Vec<String> = Vec::new();
        for key in self.symbols.keys() {
            // A submodule is the next path segment, provided the key continues
            // past it (a key ending right after the segment is a leaf symbol).
            if let Some(rest) = key.strip_prefix(&prefix) {
                if let Some((head, _)) = rest.split_once('.') {
                    if names.last().is_none_or(|last| last != head) {
                        names.push(head.to_owned());
                    }
                }
            }
        }
        names
    }
}

/// One installed component of the host application.
///
/// `label` is the short name used for qualified command names (`blog.publish`);
/// `namespace` is the dotted module path its commands live under.
#[derive(Debug, Clone)]
pub struct Component {
    pub label: String,
    pub namespace: String,
}

/// Ordered collection of installed components.
///
/// Registration order matters: later components shadow earlier ones when they
/// provide a command under the same name, so resolution walks the set in
/// reverse. Injected into the resolver rather than read from ambient state.
#[derive(Debug, Clone, Default)]
pub struct ComponentSet {
    components: Vec<Component>,
}

impl ComponentSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a component, making it the most recently registered one.
    pub fn install(&mut self, label: impl Into<String>, namespace: impl Into<String>) {
        self.components.push(Component {
            label: label.into(),
            namespace: namespace.into(),
        });
    }

    /// Look a component up by its label.
    pub fn get(&self, label: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.label == label)
    }

    /// Components in registration order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Component> {
        self.components.iter()
    }
}
