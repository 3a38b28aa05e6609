pub mod classpath;
pub mod invoker;

pub use classpath::{classpath_separator, ClasspathSet};
pub use invoker::{EntryPointInvoker, InvokerRegistry, JavaProcessInvoker, LaunchSet};
