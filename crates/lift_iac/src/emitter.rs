//! Cross-referenced emission of per-Vpc artifact families.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info};

use lift_graph::IndexedVpc;
use lift_model::{RunReport, SkipKind};

use crate::artifact::{
    Artifact, Backend, ElasticIp, InstanceDeclaration, NetworkModule, RegionSetting, RuleBlock,
    RuleDirection, SecurityGroupDeclaration, Versions, VpcAutoValues, VpcSettings, VpcVariables,
};
use crate::backend::BackendSettings;
use crate::error::{IacError, IacResult};
use crate::renderer::TemplateRenderer;
use crate::sink::ArtifactSink;

/// Opaque settings passed through from the caller.
#[derive(Debug, Clone, Default)]
pub struct EmitOptions {
    pub region: String,
    pub backend: BackendSettings,
}

impl EmitOptions {
    pub fn new(region: impl Into<String>, backend: BackendSettings) -> Self {
        Self {
            region: region.into(),
            backend,
        }
    }
}

/// What was written for one Vpc.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VpcSummary {
    pub vpc_id: String,
    pub directory: String,
    pub artifacts_written: usize,
    pub instances_written: usize,
    pub security_groups_written: usize,
    pub backend_written: bool,
}

/// What was written for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmitSummary {
    pub vpcs: Vec<VpcSummary>,
}

impl EmitSummary {
    pub fn artifacts_written(&self) -> usize {
        self.vpcs.iter().map(|v| v.artifacts_written).sum()
    }

    pub fn instances_written(&self) -> usize {
        self.vpcs.iter().map(|v| v.instances_written).sum()
    }

    pub fn security_groups_written(&self) -> usize {
        self.vpcs.iter().map(|v| v.security_groups_written).sum()
    }
}

/// Renders indexed Vpcs into their artifact files.
///
/// Rendering problems skip a single artifact and go to the report. Sink
/// errors abort the run.
pub struct Emitter {
    renderer: TemplateRenderer,
    options: EmitOptions,
}

impl Emitter {
    pub fn new(options: EmitOptions) -> Self {
        Self {
            renderer: TemplateRenderer::new(),
            options,
        }
    }

    /// Emit every Vpc in order.
    pub fn emit_all(
        &self,
        vpcs: &[IndexedVpc],
        sink: &mut dyn ArtifactSink,
        report: &mut RunReport,
    ) -> IacResult<EmitSummary> {
        let mut summary = EmitSummary::default();
        for vpc in vpcs {
            summary.vpcs.push(self.emit(vpc, sink, report)?);
        }

        info!(
            "Emitted {} artifacts for {} vpcs",
            summary.artifacts_written(),
            summary.vpcs.len()
        );
        Ok(summary)
    }

    /// Emit the artifact family of one Vpc.
    ///
    /// Security groups are emitted before instances so that an instance is
    /// only written when every group it references was written.
    pub fn emit(
        &self,
        vpc: &IndexedVpc,
        sink: &mut dyn ArtifactSink,
        report: &mut RunReport,
    ) -> IacResult<VpcSummary> {
        let directory = vpc.name();
        let mut summary = VpcSummary {
            vpc_id: vpc.id.clone(),
            directory: directory.clone(),
            ..Default::default()
        };
        debug!(vpc_id = %vpc.id, directory = %directory, "Emitting vpc");
        sink.clear(&directory)?;

        self.write(&NetworkModule { vpc_id: vpc.id.clone() }, &directory, sink, report, &mut summary)?;
        let backend_written = self.write_backend(vpc, &directory, sink, report, &mut summary)?;
        summary.backend_written = backend_written;

        let settings = VpcSettings::from_vpc(vpc);
        self.write(&VpcVariables(settings.clone()), &directory, sink, report, &mut summary)?;
        self.write(&VpcAutoValues(settings), &directory, sink, report, &mut summary)?;
        for as_value in [false, true] {
            let region = RegionSetting {
                vpc_id: vpc.id.clone(),
                region: self.options.region.clone(),
                as_value,
            };
            self.write(&region, &directory, sink, report, &mut summary)?;
        }
        self.write(&Versions { vpc_id: vpc.id.clone() }, &directory, sink, report, &mut summary)?;

        let mut failed_groups = BTreeSet::new();
        for group in &vpc.security_groups {
            let declaration = self.security_group_declaration(vpc, group, report)?;
            let written = match declaration {
                Some(declaration) => {
                    self.write(&declaration, &directory, sink, report, &mut summary)?
                }
                None => false,
            };
            if written {
                summary.security_groups_written += 1;
            } else {
                failed_groups.insert(group.index);
            }
        }

        for instance in &vpc.instances {
            let unwritten: Vec<_> = instance
                .security_groups
                .iter()
                .filter(|r| failed_groups.contains(&r.index))
                .collect();
            if !unwritten.is_empty() {
                let mut ids = vec![vpc.id.clone(), instance.id.clone()];
                ids.extend(unwritten.iter().map(|r| r.id.clone()));
                report.record(
                    SkipKind::MissingSubstitution,
                    ids,
                    format!(
                        "{}: referenced security group declaration was not written",
                        crate::artifact::EC2_INSTANCES_FILE
                    ),
                );
                continue;
            }

            let declaration = InstanceDeclaration::new(vpc, instance);
            if !self.write(&declaration, &directory, sink, report, &mut summary)? {
                continue;
            }
            summary.instances_written += 1;

            let eip = ElasticIp {
                vpc_id: vpc.id.clone(),
                index: instance.index,
                instance_id: instance.id.clone(),
            };
            self.write(&eip, &directory, sink, report, &mut summary)?;
        }

        info!(
            vpc_id = %vpc.id,
            directory = %directory,
            artifacts = summary.artifacts_written,
            "Vpc emitted"
        );
        Ok(summary)
    }

    fn write_backend(
        &self,
        vpc: &IndexedVpc,
        directory: &str,
        sink: &mut dyn ArtifactSink,
        report: &mut RunReport,
        summary: &mut VpcSummary,
    ) -> IacResult<bool> {
        let settings = &self.options.backend;
        if !settings.is_requested() {
            return Ok(false);
        }

        let missing = settings.missing(&self.options.region);
        if !missing.is_empty() {
            report.record(
                SkipKind::MissingBackendConfig,
                [vpc.id.as_str()],
                format!("backend settings blank: {}", missing.join(", ")),
            );
            return Ok(false);
        }

        let backend = Backend {
            vpc_id: vpc.id.clone(),
            vpc_name: vpc.name(),
            bucket: settings.bucket.clone().unwrap_or_default(),
            key: settings.key.clone().unwrap_or_default(),
            region: self.options.region.clone(),
            lock_table: settings.lock_table.clone().unwrap_or_default(),
        };
        self.write(&backend, directory, sink, report, summary)
    }

    /// Pre-render rule blocks and build the group declaration.
    ///
    /// Returns `None` when a rule block could not be rendered.
    fn security_group_declaration(
        &self,
        vpc: &IndexedVpc,
        group: &lift_graph::IndexedSecurityGroup,
        report: &mut RunReport,
    ) -> IacResult<Option<SecurityGroupDeclaration>> {
        let mut blocks = [String::new(), String::new()];
        let directions = [
            (RuleDirection::Ingress, &group.group.ingress),
            (RuleDirection::Egress, &group.group.egress),
        ];

        for (slot, (direction, rules)) in blocks.iter_mut().zip(directions) {
            for rule in rules.iter() {
                match self.renderer.render(&RuleBlock { direction, rule }) {
                    Ok(text) => slot.push_str(&text),
                    Err(IacError::MissingSubstitution(placeholder)) => {
                        report.record(
                            SkipKind::MissingSubstitution,
                            [vpc.id.as_str(), group.group.id.as_str()],
                            format!(
                                "{}: {:?} rule has no value for '{}'",
                                crate::artifact::SECURITY_GROUPS_FILE,
                                direction,
                                placeholder
                            ),
                        );
                        return Ok(None);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        let [ingress, egress] = blocks;
        Ok(Some(SecurityGroupDeclaration::new(vpc, group, ingress, egress)))
    }

    /// Render and append one artifact. Returns whether it was written.
    fn write<A: Artifact>(
        &self,
        artifact: &A,
        directory: &str,
        sink: &mut dyn ArtifactSink,
        report: &mut RunReport,
        summary: &mut VpcSummary,
    ) -> IacResult<bool> {
        match self.renderer.render(artifact) {
            Ok(content) => {
                sink.append(directory, artifact.file_name(), &content)?;
                summary.artifacts_written += 1;
                Ok(true)
            }
            Err(IacError::MissingSubstitution(placeholder)) => {
                report.record(
                    SkipKind::MissingSubstitution,
                    artifact.resource_ids(),
                    format!("{}: no value for '{}'", artifact.file_name(), placeholder),
                );
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
