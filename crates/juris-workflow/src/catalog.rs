//! # Template Catalog
//!
//! Read-only set of predefined workflow definitions offered for activation.
//! Template ids are stable; hosts persist them to remember which automations
//! an office has switched on.

use std::collections::BTreeMap;

use juris_core::TemplateId;

use crate::action::{Action, AlertPriority};
use crate::condition::{Condition, ConditionOperator};
use crate::definition::WorkflowDefinition;
use crate::error::ValidationError;
use crate::trigger::{Trigger, TriggerType};

/// Assign an owner and notify when a process is created.
pub const NOVO_PROCESSO_ATRIBUIR: &str = "novo-processo-atribuir";
/// Alert and email when a deadline is a week away.
pub const PRAZO_7DIAS_ALERTA: &str = "prazo-7dias-alerta";
/// Escalate deadlines two days away or less.
pub const PRAZO_CRITICO_URGENTE: &str = "prazo-critico-urgente";
/// Remind about hearings three days ahead.
pub const AUDIENCIA_LEMBRETE: &str = "audiencia-lembrete";
/// Tag and comment processes that reach `concluido`.
pub const STATUS_CONCLUIDO_ARQUIVAR: &str = "status-concluido-arquivar";
/// Notify the owner when a client comments.
pub const COMENTARIO_CLIENTE_NOTIFICAR: &str = "comentario-cliente-notificar";

/// Immutable, id-ordered collection of templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: BTreeMap<TemplateId, WorkflowDefinition>,
}

impl TemplateCatalog {
    /// The built-in templates.
    pub fn standard() -> Result<Self, ValidationError> {
        Self::from_definitions(standard_templates()?)
    }

    /// Build a catalog from arbitrary definitions.
    ///
    /// Every definition is validated; duplicate ids are rejected.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = WorkflowDefinition>,
    ) -> Result<Self, ValidationError> {
        let mut templates = BTreeMap::new();
        for definition in definitions {
            definition.validate()?;
            let id = definition.id.clone();
            if templates.insert(id.clone(), definition).is_some() {
                return Err(ValidationError::DuplicateTemplate(id.to_string()));
            }
        }
        Ok(Self { templates })
    }

    /// Template by id.
    pub fn get(&self, id: &str) -> Option<&WorkflowDefinition> {
        let id = TemplateId::new(id).ok()?;
        self.templates.get(&id)
    }

    /// All templates, ordered by id.
    pub fn list(&self) -> Vec<&WorkflowDefinition> {
        self.templates.values().collect()
    }

    /// All template ids, ordered.
    pub fn ids(&self) -> Vec<&TemplateId> {
        self.templates.keys().collect()
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn tid(id: &str) -> Result<TemplateId, ValidationError> {
    TemplateId::new(id).map_err(|e| ValidationError::InvalidTemplateId(e.to_string()))
}

fn days_within(max: i64) -> Condition {
    Condition::new("dias_restantes", ConditionOperator::LessOrEqual, max)
}

/// Definitions of the built-in templates.
pub fn standard_templates() -> Result<Vec<WorkflowDefinition>, ValidationError> {
    Ok(vec![
        WorkflowDefinition::new(
            tid(NOVO_PROCESSO_ATRIBUIR)?,
            "Atribuir responsável a novo processo",
            Trigger::new(TriggerType::ProcessCreated),
        )
        .describe("Atribui o advogado responsável e o notifica quando um processo é cadastrado.")
        .then(Action::assign_owner("advogado_padrao"))
        .then(Action::notify("responsavel", "Um novo processo foi atribuído a você.").titled("Novo processo")),
        WorkflowDefinition::new(
            tid(PRAZO_7DIAS_ALERTA)?,
            "Alerta de prazo em 7 dias",
            Trigger::new(TriggerType::DeadlineApproaching).with_condition(days_within(7)),
        )
        .describe("Cria um alerta e envia e-mail quando faltam 7 dias ou menos para o prazo.")
        .then(Action::alert("Prazo vence em até 7 dias.", AlertPriority::High))
        .then(Action::email("responsavel", "prazo_proximo").with_subject("Prazo se aproximando")),
        WorkflowDefinition::new(
            tid(PRAZO_CRITICO_URGENTE)?,
            "Prazo crítico",
            Trigger::new(TriggerType::DeadlineApproaching).with_condition(days_within(2)),
        )
        .describe("Escala prazos que vencem em até 2 dias: alerta urgente, notificação e tag.")
        .then(Action::alert("Prazo crítico: vence em até 2 dias.", AlertPriority::Urgent))
        .then(Action::notify("responsavel", "Prazo crítico exige ação imediata.").titled("Prazo crítico"))
        .then(Action::tag("urgente")),
        WorkflowDefinition::new(
            tid(AUDIENCIA_LEMBRETE)?,
            "Lembrete de audiência",
            Trigger::new(TriggerType::HearingApproaching).with_condition(days_within(3)),
        )
        .describe("Lembra o responsável e o cliente de audiências nos próximos 3 dias.")
        .then(Action::notify("responsavel", "Audiência em até 3 dias.").titled("Audiência próxima"))
        .then(Action::email("cliente", "lembrete_audiencia").with_subject("Lembrete de audiência")),
        WorkflowDefinition::new(
            tid(STATUS_CONCLUIDO_ARQUIVAR)?,
            "Arquivar processo concluído",
            Trigger::new(TriggerType::StatusChanged).with_condition(Condition::new(
                "status",
                ConditionOperator::Equal,
                "concluido",
            )),
        )
        .describe("Marca processos concluídos para arquivamento.")
        .then(Action::tag("arquivado"))
        .then(Action::comment("Processo concluído e marcado para arquivamento.")),
        WorkflowDefinition::new(
            tid(COMENTARIO_CLIENTE_NOTIFICAR)?,
            "Notificar comentário de cliente",
            Trigger::new(TriggerType::CommentAdded).with_condition(Condition::new(
                "autor_tipo",
                ConditionOperator::Equal,
                "cliente",
            )),
        )
        .describe("Avisa o responsável quando o cliente comenta no processo.")
        .then(Action::notify("responsavel", "O cliente adicionou um comentário.").titled("Comentário do cliente")),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionType;

    #[test]
    fn standard_catalog_has_six_valid_templates() {
        let catalog = TemplateCatalog::standard().unwrap();
        assert_eq!(catalog.len(), 6);
        assert!(!catalog.is_empty());
        for template in catalog.list() {
            assert!(template.validate().is_ok(), "{}", template.id);
        }
    }

    #[test]
    fn ids_are_sorted_and_stable() {
        let catalog = TemplateCatalog::standard().unwrap();
        let ids: Vec<_> = catalog.ids().iter().map(|id| id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                AUDIENCIA_LEMBRETE,
                COMENTARIO_CLIENTE_NOTIFICAR,
                NOVO_PROCESSO_ATRIBUIR,
                PRAZO_7DIAS_ALERTA,
                PRAZO_CRITICO_URGENTE,
                STATUS_CONCLUIDO_ARQUIVAR,
            ]
        );
    }

    #[test]
    fn template_shapes() {
        let catalog = TemplateCatalog::standard().unwrap();
        let shape = |id: &str| {
            let t = catalog.get(id).unwrap();
            (
                t.trigger.trigger_type,
                t.trigger.conditions.len(),
                t.actions.iter().map(Action::action_type).collect::<Vec<_>>(),
            )
        };
        assert_eq!(
            shape(NOVO_PROCESSO_ATRIBUIR),
            (TriggerType::ProcessCreated, 0, vec![ActionType::AssignOwner, ActionType::SendNotification])
        );
        assert_eq!(
            shape(PRAZO_7DIAS_ALERTA),
            (TriggerType::DeadlineApproaching, 1, vec![ActionType::CreateAlert, ActionType::SendEmail])
        );
        assert_eq!(
            shape(PRAZO_CRITICO_URGENTE),
            (
                TriggerType::DeadlineApproaching,
                1,
                vec![ActionType::CreateAlert, ActionType::SendNotification, ActionType::AddTag]
            )
        );
        assert_eq!(
            shape(AUDIENCIA_LEMBRETE),
            (TriggerType::HearingApproaching, 1, vec![ActionType::SendNotification, ActionType::SendEmail])
        );
        assert_eq!(
            shape(STATUS_CONCLUIDO_ARQUIVAR),
            (TriggerType::StatusChanged, 1, vec![ActionType::AddTag, ActionType::AddComment])
        );
        assert_eq!(
            shape(COMENTARIO_CLIENTE_NOTIFICAR),
            (TriggerType::CommentAdded, 1, vec![ActionType::SendNotification])
        );
    }

    #[test]
    fn critical_deadline_is_urgent() {
        let catalog = TemplateCatalog::standard().unwrap();
        let t = catalog.get(PRAZO_CRITICO_URGENTE).unwrap();
        assert!(matches!(
            &t.actions[0],
            Action::CreateAlert(p) if p.prioridade == AlertPriority::Urgent
        ));
        assert_eq!(t.actions[2], Action::tag("urgente"));
    }

    #[test]
    fn unknown_or_malformed_ids_are_absent() {
        let catalog = TemplateCatalog::standard().unwrap();
        assert!(catalog.get("nao-existe").is_none());
        assert!(catalog.get("Not An Id").is_none());
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut defs = standard_templates().unwrap();
        defs.push(defs[0].clone());
        assert_eq!(
            TemplateCatalog::from_definitions(defs).unwrap_err(),
            ValidationError::DuplicateTemplate(NOVO_PROCESSO_ATRIBUIR.into())
        );
    }

    #[test]
    fn invalid_definitions_are_rejected() {
        let def = WorkflowDefinition::new(
            TemplateId::new("vazio").unwrap(),
            "Vazio",
            Trigger::new(TriggerType::ProcessCreated),
        );
        assert!(TemplateCatalog::from_definitions([def]).is_err());
    }

    #[test]
    fn templates_roundtrip_through_json() {
        for template in standard_templates().unwrap() {
            let json = serde_json::to_string(&template).unwrap();
            let back = WorkflowDefinition::from_json(&json).unwrap();
            assert_eq!(back, template);
        }
    }
}
