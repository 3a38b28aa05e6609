// ─── Entry-Point Invoker ───
// The hand-off seam at the end of the pipeline. Provisioning produces a
// LaunchSet; what actually runs it is a registered collaborator, with a
// java subprocess as the default.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::core::error::{BundlerError, BundlerResult};
use crate::core::launch::classpath::ClasspathSet;

/// Everything the pipeline produces: the ordered classpath, the entry-point
/// symbol, and the process arguments to forward.
#[derive(Debug)]
pub struct LaunchSet {
    pub classpath: ClasspathSet,
    pub main_class: String,
    pub args: Vec<String>,
}

/// A collaborator able to invoke a provisioned assembly.
#[async_trait]
pub trait EntryPointInvoker: Send + Sync {
    async fn invoke(&self, launch: &LaunchSet) -> BundlerResult<()>;
}

/// Default invoker: spawns `java -cp <classpath> <main_class> <args...>`
/// and waits for it to exit.
pub struct JavaProcessInvoker;

impl JavaProcessInvoker {
    fn java_binary() -> PathBuf {
        // JAVA_HOME wins when it points at a real binary; otherwise rely on
        // PATH lookup.
        if let Ok(java_home) = std::env::var("JAVA_HOME") {
            let candidate = PathBuf::from(java_home).join("bin").join(if cfg!(windows) {
                "java.exe"
            } else {
                "java"
            });
            if candidate.exists() {
                return candidate;
            }
        }
        PathBuf::from("java")
    }
}

#[async_trait]
impl EntryPointInvoker for JavaProcessInvoker {
    async fn invoke(&self, launch: &LaunchSet) -> BundlerResult<()> {
        let java_bin = Self::java_binary();
        let classpath = launch.classpath.join();
        info!("Starting {}", launch.main_class);
        debug!("Classpath: {}", classpath);

        let status = tokio::process::Command::new(&java_bin)
            .arg("-cp")
            .arg(&classpath)
            .arg(&launch.main_class)
            .args(&launch.args)
            .status()
            .await
            .map_err(|e| BundlerError::LaunchFailed(format!("cannot spawn {java_bin:?}: {e}")))?;

        if !status.success() {
            return Err(BundlerError::LaunchFailed(format!(
                "{} exited with {}",
                launch.main_class, status
            )));
        }
        Ok(())
    }
}

/// Maps entry-point symbols to invokers, falling back to the java process
/// invoker for unregistered symbols.
///
/// Embedders register their own invoker per symbol; disabling the fallback
/// turns an unknown symbol into [`BundlerError::EntryPointUnavailable`].
pub struct InvokerRegistry {
    invokers: HashMap<String, Box<dyn EntryPointInvoker>>,
    process_fallback: bool,
}

impl Default for InvokerRegistry {
    fn default() -> Self {
        Self {
            invokers: HashMap::new(),
            process_fallback: true,
        }
    }
}

impl InvokerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_process_fallback(mut self) -> Self {
        self.process_fallback = false;
        self
    }

    pub fn register(&mut self, symbol: impl Into<String>, invoker: Box<dyn EntryPointInvoker>) {
        self.invokers.insert(symbol.into(), invoker);
    }

    /// Dispatch a launch set to the invoker registered for its symbol.
    ///
    /// The caller is expected to have handled the empty-symbol case already
    /// (an empty symbol means "assemble but do not launch").
    pub async fn invoke(&self, launch: &LaunchSet) -> BundlerResult<()> {
        if let Some(invoker) = self.invokers.get(&launch.main_class) {
            return invoker.invoke(launch).await;
        }
        if self.process_fallback {
            return JavaProcessInvoker.invoke(launch).await;
        }
        Err(BundlerError::EntryPointUnavailable(
            launch.main_class.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct RecordingInvoker {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EntryPointInvoker for RecordingInvoker {
        async fn invoke(&self, _launch: &LaunchSet) -> BundlerResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn launch_set(main_class: &str) -> LaunchSet {
        LaunchSet {
            classpath: ClasspathSet::new(),
            main_class: main_class.to_string(),
            args: Vec::new(),
        }
    }

    #[tokio::test]
    async fn registered_invoker_is_dispatched_by_symbol() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = InvokerRegistry::new().without_process_fallback();
        registry.register(
            "com.example.Main",
            Box::new(RecordingInvoker { calls: calls.clone() }),
        );

        registry.invoke(&launch_set("com.example.Main")).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_symbol_without_fallback_is_unavailable() {
        let registry = InvokerRegistry::new().without_process_fallback();
        let err = registry.invoke(&launch_set("com.example.Missing")).await.unwrap_err();
        assert!(matches!(
            err,
            BundlerError::EntryPointUnavailable(symbol) if symbol == "com.example.Missing"
        ));
    }

    #[tokio::test]
    async fn registered_invoker_shadows_the_process_fallback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = InvokerRegistry::new();
        registry.register(
            "com.example.Main",
            Box::new(RecordingInvoker { calls: calls.clone() }),
        );

        registry.invoke(&launch_set("com.example.Main")).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
