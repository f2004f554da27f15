/// Enumerated layout-walking contexts.
/// Stacked by tree-walkers (flattening, stream export) and reported upon failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorContext {
    Library(String),
    Component(String),
    Instance(String),
    Port(String),
    Layer(String),
}
impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Library(s) => write!(f, "library `{}`", s),
            Self::Component(s) => write!(f, "component `{}`", s),
            Self::Instance(s) => write!(f, "instance `{}`", s),
            Self::Port(s) => write!(f, "port `{}`", s),
            Self::Layer(s) => write!(f, "layer `{}`", s),
        }
    }
}
