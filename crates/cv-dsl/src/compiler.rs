use cv_core::artifact::FACTORY_FILE;
use cv_core::filename::FILE_EXTENSION;
use cv_core::{
    Artifact, ArtifactKind, BaseClass, BuildConfig, CvError, CvResult, FactoryFunction, Reporter,
    Variant, derive_file_name,
};
use indexmap::IndexMap;

use crate::ast::{self, Program, Property, Requirement};
use crate::codegen::{self, FactoryEntry};

/// Everything one compilation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    /// Name from the `project` declaration.
    pub project_name: String,
    /// One artifact per component, in declaration order.
    pub components: Vec<Artifact>,
    /// One artifact per accepted system, in declaration order.
    pub systems: Vec<Artifact>,
    /// The entity factory.
    pub factory: Artifact,
    /// Warnings issued (only non-empty when warnings do not abort).
    pub warnings: Vec<String>,
    /// Systems rejected for an empty requirement set.
    pub rejected_systems: Vec<String>,
}

impl CompileOutput {
    /// Components, then systems, then the factory.
    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.components
            .iter()
            .chain(&self.systems)
            .chain(std::iter::once(&self.factory))
    }

    /// Number of artifacts to persist.
    pub fn artifact_count(&self) -> usize {
        self.components.len() + self.systems.len() + 1
    }

    /// Whether every declared system was accepted.
    pub fn is_clean(&self) -> bool {
        self.rejected_systems.is_empty()
    }
}

/// Component name mapped to its merged property bag.
type ResolvedTemplate = IndexMap<String, Vec<Property>>;

/// Per-compilation state, dropped once the artifacts exist.
struct CompileContext<'c> {
    config: &'c BuildConfig,
    reporter: &'c mut dyn Reporter,
    templates: IndexMap<String, ResolvedTemplate>,
    warnings: Vec<String>,
}

/// Compile a parsed program into artifacts.
///
/// Components are compiled first, then templates (building the factory),
/// then systems, which may reference templates. Warnings and rejected
/// systems are sent to `reporter` as they happen; a returned error is fatal
/// and is left for the caller to report.
pub fn compile(
    program: &Program,
    config: &BuildConfig,
    reporter: &mut dyn Reporter,
) -> CvResult<CompileOutput> {
    let mut ctx = CompileContext {
        config,
        reporter,
        templates: IndexMap::new(),
        warnings: Vec::new(),
    };

    let components = ctx.compile_components(&program.components)?;
    let factory = ctx.compile_templates(&program.templates)?;
    let (systems, rejected_systems) = ctx.compile_systems(&program.systems)?;

    tracing::info!(
        project = %program.name.node,
        variant = %config.variant,
        components = components.len(),
        templates = program.templates.len(),
        systems = systems.len(),
        rejected = rejected_systems.len(),
        "compiled program"
    );

    Ok(CompileOutput {
        project_name: program.name.node.clone(),
        components,
        systems,
        factory,
        warnings: ctx.warnings,
        rejected_systems,
    })
}

impl CompileContext<'_> {
    fn module(&self) -> &'static str {
        self.config.variant.module_name()
    }

    /// Issue a warning; fails when warnings are configured to abort.
    fn warn(&mut self, message: String) -> CvResult<()> {
        tracing::warn!("{message}");
        self.reporter.warning(&message);
        if self.config.warnings_abort() {
            return Err(CvError::WarningAbort(message));
        }
        self.warnings.push(message);
        Ok(())
    }

    /// Warn when a second artifact of the same kind derives an existing file name.
    fn claim_file_name(
        &mut self,
        claimed: &mut IndexMap<String, String>,
        kind: &str,
        name: &str,
        filename: &str,
    ) -> CvResult<()> {
        match claimed.get(filename) {
            Some(first) => {
                let message = format!(
                    "{kind} '{name}' and '{first}' both generate '{filename}'; the later one wins"
                );
                self.warn(message)
            }
            None => {
                claimed.insert(filename.to_string(), name.to_string());
                Ok(())
            }
        }
    }

    fn compile_components(&mut self, components: &[ast::Component]) -> CvResult<Vec<Artifact>> {
        let mut claimed = IndexMap::new();
        let mut artifacts = Vec::with_capacity(components.len());

        for component in components {
            let name = &component.name.node;
            let filename = derive_file_name(name, FILE_EXTENSION);
            self.claim_file_name(&mut claimed, "Component", name, &filename)?;

            artifacts.push(Artifact {
                name: name.clone(),
                source: codegen::render_component(self.module(), name, &component.properties),
                filename,
                kind: ArtifactKind::Component,
            });
        }

        tracing::debug!(count = artifacts.len(), "compiled components");
        Ok(artifacts)
    }

    /// Resolve every template in declaration order and render the factory.
    fn compile_templates(&mut self, templates: &[ast::Template]) -> CvResult<Artifact> {
        let mut resolved_in_order: Vec<(String, ResolvedTemplate)> =
            Vec::with_capacity(templates.len());
        let mut imports: IndexMap<String, String> = IndexMap::new();

        for template in templates {
            let name = &template.name.node;

            let mut resolved = match &template.parent {
                Some(parent) => self
                    .templates
                    .get(&parent.node)
                    .cloned()
                    .ok_or_else(|| CvError::UndeclaredParent {
                        template: name.clone(),
                        parent: parent.node.clone(),
                    })?,
                None => ResolvedTemplate::new(),
            };
            for instance in &template.components {
                resolved.insert(instance.name.node.clone(), instance.properties.clone());
            }

            for component in resolved.keys() {
                imports
                    .entry(component.clone())
                    .or_insert_with(|| derive_file_name(component, FILE_EXTENSION));
            }

            if self.templates.contains_key(name) {
                self.warn(format!(
                    "Template '{name}' is declared more than once; the later one wins"
                ))?;
            }
            tracing::debug!(template = %name, components = resolved.len(), "resolved template");
            self.templates.insert(name.clone(), resolved.clone());
            resolved_in_order.push((name.clone(), resolved));
        }

        let entries: Vec<FactoryEntry<'_>> = resolved_in_order
            .iter()
            .map(|(template, components)| FactoryEntry {
                template,
                components,
            })
            .collect();
        let functions = resolved_in_order
            .iter()
            .map(|(template, _)| FactoryFunction {
                entity_type: template.clone(),
                function_name: codegen::factory_function_name(template),
            })
            .collect();

        Ok(Artifact {
            name: "Factory".to_string(),
            filename: FACTORY_FILE.to_string(),
            source: codegen::render_factory(self.module(), &entries, &imports),
            kind: ArtifactKind::Factory { functions },
        })
    }

    /// The base class a system derives from under the configured variant.
    fn system_base(&mut self, system: &ast::System) -> CvResult<Option<BaseClass>> {
        let name = &system.name.node;
        match (self.config.variant, &system.parent) {
            (Variant::ThreeD, parent) => {
                if parent.is_some() {
                    self.warn(format!("Ignoring system inheritance on '{name}'"))?;
                }
                Ok(Some(BaseClass::System))
            }
            (Variant::TwoD, None) => Ok(None),
            (Variant::TwoD, Some(parent)) => BaseClass::parse_system_parent(&parent.node)
                .map(Some)
                .ok_or_else(|| CvError::UnknownSystemBase {
                    system: name.clone(),
                    base: parent.node.clone(),
                }),
        }
    }

    /// Required components, de-duplicated in order of first appearance.
    fn required_components(&self, system: &ast::System) -> Vec<String> {
        let mut required: Vec<String> = Vec::new();
        let mut add = |component: &str| {
            if !required.iter().any(|c| c == component) {
                required.push(component.to_string());
            }
        };

        match &system.requirement {
            Requirement::Components(names) => {
                for name in names {
                    add(&name.node);
                }
            }
            Requirement::Entities(templates) => {
                for template in templates {
                    match self.templates.get(&template.node) {
                        Some(resolved) => {
                            for component in resolved.keys() {
                                add(component);
                            }
                        }
                        None => tracing::warn!(
                            system = %system.name.node,
                            template = %template.node,
                            "system references an undeclared template"
                        ),
                    }
                }
            }
        }

        required
    }

    fn compile_systems(
        &mut self,
        systems: &[ast::System],
    ) -> CvResult<(Vec<Artifact>, Vec<String>)> {
        let mut claimed = IndexMap::new();
        let mut artifacts = Vec::with_capacity(systems.len());
        let mut rejected = Vec::new();

        for system in systems {
            let name = &system.name.node;
            let base = self.system_base(system)?;

            let required = self.required_components(system);
            if required.is_empty() {
                let error = CvError::EmptyRequirements {
                    system: name.clone(),
                };
                tracing::warn!("{error}");
                self.reporter.rejected(&error);
                rejected.push(name.clone());
                continue;
            }

            let filename = derive_file_name(name, FILE_EXTENSION);
            self.claim_file_name(&mut claimed, "System", name, &filename)?;

            artifacts.push(Artifact {
                name: name.clone(),
                source: codegen::render_system(self.module(), name, base, &required),
                filename,
                kind: ArtifactKind::System { base },
            });
        }

        tracing::debug!(
            count = artifacts.len(),
            rejected = rejected.len(),
            "compiled systems"
        );
        Ok((artifacts, rejected))
    }
}
