use blobbind_path::{
    BindingContract, BindingData, PathError, PathTemplate, Placeholder, TemplateResolver,
};
use blobbind_store::{BlobObject, BlobStore};
use blobbind_types::{BlobPath, CaseInsensitiveMap};
use tracing::debug;

use crate::error::{TriggerError, TriggerResult};
use crate::status::BindStatus;

/// A handler parameter bound to a blob derived from the triggering one.
#[derive(Clone, Debug)]
pub struct InputBinding {
    pub parameter: String,
    pub resolver: TemplateResolver,
}

/// A compiled blob trigger.
///
/// Holds the primary template, the binding contract it advertises, and any
/// declared input bindings. Everything is compiled once at construction.
#[derive(Clone, Debug)]
pub struct BlobTrigger {
    name: String,
    template: PathTemplate,
    contract: BindingContract,
    inputs: Vec<InputBinding>,
}

impl BlobTrigger {
    /// Compile a trigger from its primary path pattern.
    pub fn new(name: impl Into<String>, pattern: &str) -> TriggerResult<Self> {
        let template = PathTemplate::compile(pattern)?;
        let contract = template.binding_contract()?;
        Ok(Self {
            name: name.into(),
            template,
            contract,
            inputs: Vec::new(),
        })
    }

    /// Declare an input parameter resolved from `pattern`.
    ///
    /// Unqualified placeholders must name a capture of the primary template;
    /// `metadata.<key>` placeholders can only be checked at bind time.
    pub fn with_input(mut self, parameter: impl Into<String>, pattern: &str) -> TriggerResult<Self> {
        let parameter = parameter.into();
        if self
            .inputs
            .iter()
            .any(|input| input.parameter.eq_ignore_ascii_case(&parameter))
        {
            return Err(TriggerError::DuplicateInput {
                trigger: self.name.clone(),
                parameter,
            });
        }

        let resolver = TemplateResolver::compile(pattern)?;
        for placeholder in resolver.placeholders() {
            if let Placeholder::Capture(name) = placeholder {
                if !self.contract.contains(name) {
                    return Err(PathError::UnresolvedBindingParameter { name: name.clone() }.into());
                }
            }
        }

        self.inputs.push(InputBinding { parameter, resolver });
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    /// The names and types this trigger's handler may bind to.
    pub fn contract(&self) -> &BindingContract {
        &self.contract
    }

    pub fn inputs(&self) -> &[InputBinding] {
        &self.inputs
    }

    /// Match a blob against this trigger.
    ///
    /// Returns `None` if the trigger does not apply to the blob.
    pub fn bind(&self, blob: &BlobObject) -> Option<TriggerInvocation> {
        let binding = self.template.matches(&blob.container, &blob.name)?;
        debug!(
            trigger = %self.name,
            container = %blob.container,
            blob = %blob.name,
            "trigger matched"
        );
        Some(TriggerInvocation {
            trigger: self.name.clone(),
            blob: blob.clone(),
            binding,
        })
    }

    /// Resolve and fetch every declared input for an invocation.
    ///
    /// Failures are reported per parameter rather than aborting the rest.
    pub fn bind_inputs<S: BlobStore + ?Sized>(
        &self,
        invocation: &TriggerInvocation,
        store: &S,
    ) -> Vec<BindStatus> {
        self.inputs
            .iter()
            .map(|input| match invocation.fetch(store, &input.resolver) {
                Ok(blob) => BindStatus::bound(&input.parameter, blob),
                Err(e) => BindStatus::failed(&input.parameter, e.to_string()),
            })
            .collect()
    }
}

/// A trigger that matched a blob, with the values captured from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerInvocation {
    trigger: String,
    blob: BlobObject,
    binding: BindingData,
}

impl TriggerInvocation {
    /// Name of the trigger that matched.
    pub fn trigger_name(&self) -> &str {
        &self.trigger
    }

    /// The triggering blob.
    pub fn blob(&self) -> &BlobObject {
        &self.blob
    }

    /// Captures from the trigger's path template.
    pub fn binding_data(&self) -> &BindingData {
        &self.binding
    }

    /// All values a handler can bind by name: the captures plus the
    /// triggering blob's metadata under `metadata.<key>`.
    pub fn binding_values(&self) -> CaseInsensitiveMap<String> {
        let mut values: CaseInsensitiveMap<String> = self
            .binding
            .iter()
            .map(|(k, v)| (k, v.to_string()))
            .collect();
        for (key, value) in self.blob.metadata.iter() {
            values.insert(format!("{}{key}", blobbind_path::METADATA_PREFIX), value.clone());
        }
        values
    }

    /// Resolve a dependent path pattern against this invocation.
    pub fn resolve_path(&self, pattern: &str) -> TriggerResult<BlobPath> {
        let resolver = TemplateResolver::compile(pattern)?;
        Ok(resolver.resolve(&self.binding, &self.blob.metadata)?)
    }

    /// Resolve a dependent path pattern and fetch the blob it names.
    pub fn resolve_input<S: BlobStore + ?Sized>(
        &self,
        store: &S,
        pattern: &str,
    ) -> TriggerResult<BlobObject> {
        let resolver = TemplateResolver::compile(pattern)?;
        self.fetch(store, &resolver)
    }

    fn fetch<S: BlobStore + ?Sized>(
        &self,
        store: &S,
        resolver: &TemplateResolver,
    ) -> TriggerResult<BlobObject> {
        let path = resolver.resolve(&self.binding, &self.blob.metadata)?;
        Ok(store.get_object(path.container(), path.name())?)
    }
}
