// Export service - Use case for producing shareable dashboard documents
use crate::application::datasource_registry::{DataSourceDescriptor, DataSourceRegistry};
use crate::domain::dashboard::{Dashboard, Panel};
use crate::domain::datasource::DataSourceRef;
use crate::domain::export::{
    ExportDocument, ExportInput, ExportMode, ExportableDashboard, ExternalRequirement,
    INPUT_TYPE_CONSTANT, INPUT_TYPE_DATASOURCE, REQUIREMENT_TYPE_DATASOURCE,
};
use futures::future::join_all;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Clone)]
pub struct ExportService {
    registry: Arc<dyn DataSourceRegistry>,
}

impl ExportService {
    pub fn new(registry: Arc<dyn DataSourceRegistry>) -> Self {
        Self { registry }
    }

    /// Single dispatch point for both export modes.
    pub async fn export(
        &self,
        dashboard: &Dashboard,
        mode: ExportMode,
    ) -> anyhow::Result<ExportDocument> {
        match mode {
            ExportMode::Local => Ok(ExportDocument::Local(self.clone_for_local_save(dashboard))),
            ExportMode::External => Ok(ExportDocument::External(
                self.make_exportable(dashboard).await?,
            )),
        }
    }

    /// Deep copy of the save model. The result shares nothing with the
    /// live dashboard; identifiers are preserved as-is.
    pub fn clone_for_local_save(&self, dashboard: &Dashboard) -> Dashboard {
        dashboard.clone()
    }

    /// Rewrite every concrete datasource reference (panels, template
    /// variables, annotations) into a `${DS_*}` placeholder expression,
    /// recording one `__inputs` entry per underlying datasource and one
    /// `__requires` entry per resolved plugin. Constant variables become
    /// `VAR_*` inputs. Lookup failures degrade to unresolved placeholders
    /// instead of failing the export.
    pub async fn make_exportable(
        &self,
        dashboard: &Dashboard,
    ) -> anyhow::Result<ExportableDashboard> {
        let mut dash = self.clone_for_local_save(dashboard);

        // Distinct rewritable references, in document order.
        let mut references: Vec<DataSourceRef> = Vec::new();
        collect_panel_refs(&dash.panels, &mut references);
        for variable in &dash.templating.list {
            collect_ref(&variable.datasource, &mut references);
        }
        for annotation in &dash.annotations.list {
            collect_ref(&annotation.datasource, &mut references);
        }

        let lookups = join_all(
            references
                .iter()
                .map(|reference| self.resolve_degraded(reference)),
        )
        .await;

        let mut namer = InputNamer::default();
        let mut placeholders = PlaceholderTable::default();
        for (reference, resolved) in references.iter().zip(lookups) {
            placeholders.add(&mut namer, reference, resolved);
        }

        rewrite_panels(&mut dash.panels, &placeholders);
        for variable in &mut dash.templating.list {
            rewrite_slot(&mut variable.datasource, &placeholders);
        }
        for annotation in &mut dash.annotations.list {
            rewrite_slot(&mut annotation.datasource, &placeholders);
        }

        let (mut inputs, requires) = placeholders.into_parts();

        for variable in &mut dash.templating.list {
            if !variable.is_constant() {
                continue;
            }
            let value = match variable.query.take() {
                Some(Value::String(text)) => text,
                Some(other) => other.to_string(),
                None => String::new(),
            };
            let name = namer.claim(placeholder_name("VAR", &variable.name));
            variable.query = Some(Value::String(format!("${{{name}}}")));
            inputs.push(ExportInput {
                name,
                input_type: INPUT_TYPE_CONSTANT.to_string(),
                plugin_id: String::new(),
                value,
            });
        }

        Ok(ExportableDashboard {
            inputs,
            requires,
            dashboard: dash,
        })
    }

    async fn resolve_degraded(&self, reference: &DataSourceRef) -> Option<DataSourceDescriptor> {
        match self.registry.resolve(reference).await {
            Ok(Some(descriptor)) => Some(descriptor),
            Ok(None) => {
                tracing::warn!(
                    "Datasource {:?} not found in registry, exporting unresolved placeholder",
                    reference.lookup_key()
                );
                None
            }
            Err(error) => {
                tracing::warn!(
                    "Datasource lookup for {:?} failed ({:#}), exporting unresolved placeholder",
                    reference.lookup_key(),
                    error
                );
                None
            }
        }
    }
}

fn collect_ref(slot: &Option<DataSourceRef>, out: &mut Vec<DataSourceRef>) {
    if let Some(reference) = slot {
        if !reference.is_portable()
            && !out
                .iter()
                .any(|seen| seen.lookup_key() == reference.lookup_key())
        {
            out.push(reference.clone());
        }
    }
}

fn collect_panel_refs(panels: &[Panel], out: &mut Vec<DataSourceRef>) {
    for panel in panels {
        collect_ref(&panel.datasource, out);
        collect_panel_refs(&panel.panels, out);
    }
}

fn rewrite_panels(panels: &mut [Panel], placeholders: &PlaceholderTable) {
    for panel in panels {
        rewrite_slot(&mut panel.datasource, placeholders);
        rewrite_panels(&mut panel.panels, placeholders);
    }
}

fn rewrite_slot(slot: &mut Option<DataSourceRef>, placeholders: &PlaceholderTable) {
    if let Some(reference) = slot {
        if let Some(expression) = placeholders.expression_for(reference) {
            *slot = Some(DataSourceRef::Name(expression));
        }
    }
}

/// `{PREFIX}_{NAME}` with the name uppercased, whitespace mapped to `_`
/// and other non-alphanumerics dropped.
fn placeholder_name(prefix: &str, raw: &str) -> String {
    let body: String = raw
        .to_uppercase()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if body.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}_{body}")
    }
}

#[derive(Default)]
struct InputNamer {
    taken: HashSet<String>,
}

impl InputNamer {
    fn claim(&mut self, base: String) -> String {
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}_{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

struct PlaceholderEntry {
    input: ExportInput,
    requirement: Option<ExternalRequirement>,
}

/// One placeholder per underlying datasource. References that resolve to
/// the same uid share an entry even when the raw keys differ.
#[derive(Default)]
struct PlaceholderTable {
    entries: Vec<PlaceholderEntry>,
    by_lookup_key: HashMap<String, usize>,
    by_canonical: HashMap<String, usize>,
}

impl PlaceholderTable {
    fn add(
        &mut self,
        namer: &mut InputNamer,
        reference: &DataSourceRef,
        resolved: Option<DataSourceDescriptor>,
    ) {
        let Some(lookup_key) = reference.lookup_key() else {
            return;
        };
        let canonical = match &resolved {
            Some(descriptor) => format!("uid:{}", descriptor.uid),
            None => format!("raw:{lookup_key}"),
        };
        if let Some(&index) = self.by_canonical.get(&canonical) {
            self.by_lookup_key.insert(lookup_key.to_string(), index);
            return;
        }

        let display = resolved
            .as_ref()
            .map(|descriptor| descriptor.name.clone())
            .unwrap_or_else(|| lookup_key.to_string());
        let input = ExportInput {
            name: namer.claim(placeholder_name("DS", &display)),
            input_type: INPUT_TYPE_DATASOURCE.to_string(),
            plugin_id: resolved
                .as_ref()
                .map(|descriptor| descriptor.plugin_id.clone())
                .unwrap_or_default(),
            value: resolved
                .as_ref()
                .map(|descriptor| descriptor.uid.clone())
                .unwrap_or_default(),
        };
        let requirement = resolved.as_ref().map(|descriptor| ExternalRequirement {
            requirement_type: REQUIREMENT_TYPE_DATASOURCE.to_string(),
            id: descriptor.plugin_id.clone(),
            name: descriptor.name.clone(),
            version: descriptor.plugin_version.clone().unwrap_or_default(),
        });

        let index = self.entries.len();
        self.entries.push(PlaceholderEntry { input, requirement });
        self.by_lookup_key.insert(lookup_key.to_string(), index);
        self.by_canonical.insert(canonical, index);
    }

    fn expression_for(&self, reference: &DataSourceRef) -> Option<String> {
        if reference.is_portable() {
            return None;
        }
        let index = *self.by_lookup_key.get(reference.lookup_key()?)?;
        Some(format!("${{{}}}", self.entries[index].input.name))
    }

    /// Inputs in first-seen order; requirements deduplicated by plugin id.
    fn into_parts(self) -> (Vec<ExportInput>, Vec<ExternalRequirement>) {
        let mut inputs = Vec::with_capacity(self.entries.len());
        let mut requires: Vec<ExternalRequirement> = Vec::new();
        for entry in self.entries {
            if let Some(requirement) = entry.requirement {
                if !requires.iter().any(|seen| seen.id == requirement.id) {
                    requires.push(requirement);
                }
            }
            inputs.push(entry.input);
        }
        (inputs, requires)
    }
}
