//! # Actions
//!
//! [`Action`] is a sum type over the side effects a workflow can request.
//! Each known type carries a typed parameter payload decoded and validated
//! when the definition is loaded, so a workflow that names a known action
//! with missing parameters never reaches the registry.
//!
//! Type names the engine does not know are kept as [`Action::Unregistered`]
//! with their raw parameters. They load and activate normally and fail at
//! dispatch time if no handler claims them.
//!
//! Wire form: `{ "type": "<name>", "parameters": { ... } }`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// ActionType
// ---------------------------------------------------------------------------

/// Discriminant of an [`Action`], used as the handler lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    /// `atribuir_responsavel`
    AssignOwner,
    /// `enviar_notificacao`
    SendNotification,
    /// `enviar_email`
    SendEmail,
    /// `criar_alerta`
    CreateAlert,
    /// `adicionar_tag`
    AddTag,
    /// `adicionar_comentario`
    AddComment,
    /// `alterar_status`
    ChangeStatus,
    /// Any other type name.
    Other(String),
}

impl ActionType {
    /// The action types the engine knows payloads for.
    pub const KNOWN: [ActionType; 7] = [
        Self::AssignOwner,
        Self::SendNotification,
        Self::SendEmail,
        Self::CreateAlert,
        Self::AddTag,
        Self::AddComment,
        Self::ChangeStatus,
    ];

    /// Wire name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::AssignOwner => "atribuir_responsavel",
            Self::SendNotification => "enviar_notificacao",
            Self::SendEmail => "enviar_email",
            Self::CreateAlert => "criar_alerta",
            Self::AddTag => "adicionar_tag",
            Self::AddComment => "adicionar_comentario",
            Self::ChangeStatus => "alterar_status",
            Self::Other(name) => name,
        }
    }

    /// Name of the host capability that performs this action.
    pub fn capability_name(&self) -> Option<&'static str> {
        match self {
            Self::AssignOwner => Some("assignOwner"),
            Self::SendNotification => Some("sendNotification"),
            Self::SendEmail => Some("sendEmail"),
            Self::CreateAlert => Some("createAlert"),
            Self::AddTag => Some("addTag"),
            Self::AddComment => Some("addComment"),
            Self::ChangeStatus => Some("changeStatus"),
            Self::Other(_) => None,
        }
    }

    /// Parameters that must be present and non-blank.
    pub fn required_parameters(&self) -> &'static [&'static str] {
        match self {
            Self::AssignOwner => &["responsavel"],
            Self::SendNotification => &["destinatario", "mensagem"],
            Self::SendEmail => &["destinatario", "template"],
            Self::CreateAlert => &["mensagem"],
            Self::AddTag => &["tag"],
            Self::AddComment => &["texto"],
            Self::ChangeStatus => &["status"],
            Self::Other(_) => &[],
        }
    }

    /// Whether this is one of the [`KNOWN`](Self::KNOWN) types.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<&str> for ActionType {
    fn from(name: &str) -> Self {
        Self::KNOWN
            .iter()
            .find(|t| t.as_str() == name)
            .cloned()
            .unwrap_or_else(|| Self::Other(name.to_string()))
    }
}

impl From<String> for ActionType {
    fn from(name: String) -> Self {
        match Self::from(name.as_str()) {
            Self::Other(_) => Self::Other(name),
            known => known,
        }
    }
}

impl From<ActionType> for String {
    fn from(t: ActionType) -> Self {
        match t {
            ActionType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Parameter payloads
// ---------------------------------------------------------------------------

/// Parameters of `atribuir_responsavel`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignOwnerParams {
    /// User or role that becomes responsible for the entity.
    pub responsavel: String,
}

/// Parameters of `enviar_notificacao`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationParams {
    /// Recipient user, role or placeholder such as `responsavel`.
    pub destinatario: String,
    /// Notification body.
    pub mensagem: String,
    /// Optional title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,
}

/// Parameters of `enviar_email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailParams {
    /// Recipient address or placeholder.
    pub destinatario: String,
    /// Name of the email template the host renders.
    pub template: String,
    /// Optional subject line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assunto: Option<String>,
}

/// Severity of an alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertPriority {
    /// `baixa`
    #[serde(rename = "baixa")]
    Low,
    /// `media`
    #[default]
    #[serde(rename = "media")]
    Medium,
    /// `alta`
    #[serde(rename = "alta")]
    High,
    /// `urgente`
    #[serde(rename = "urgente")]
    Urgent,
}

/// Parameters of `criar_alerta`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertParams {
    /// Alert text.
    pub mensagem: String,
    /// Severity, `media` when omitted.
    #[serde(default)]
    pub prioridade: AlertPriority,
}

/// Parameters of `adicionar_tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagParams {
    /// Tag to attach to the entity.
    pub tag: String,
}

/// Parameters of `adicionar_comentario`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentParams {
    /// Comment body.
    pub texto: String,
}

/// Parameters of `alterar_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusParams {
    /// New status value.
    pub status: String,
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// One side-effecting step of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAction", into = "RawAction")]
pub enum Action {
    /// Assign an owner to the entity.
    AssignOwner(AssignOwnerParams),
    /// Send an in-app notification.
    SendNotification(NotificationParams),
    /// Send a templated email.
    SendEmail(EmailParams),
    /// Raise an alert.
    CreateAlert(AlertParams),
    /// Attach a tag.
    AddTag(TagParams),
    /// Add a comment.
    AddComment(CommentParams),
    /// Change the entity's status.
    ChangeStatus(StatusParams),
    /// A type name the engine has no payload for.
    Unregistered {
        /// Wire type name.
        action_type: String,
        /// Raw parameters.
        parameters: Map<String, Value>,
    },
}

impl Action {
    /// `atribuir_responsavel`.
    pub fn assign_owner(responsavel: impl Into<String>) -> Self {
        Self::AssignOwner(AssignOwnerParams {
            responsavel: responsavel.into(),
        })
    }

    /// `enviar_notificacao` without a title.
    pub fn notify(destinatario: impl Into<String>, mensagem: impl Into<String>) -> Self {
        Self::SendNotification(NotificationParams {
            destinatario: destinatario.into(),
            mensagem: mensagem.into(),
            titulo: None,
        })
    }

    /// `enviar_email` without a subject.
    pub fn email(destinatario: impl Into<String>, template: impl Into<String>) -> Self {
        Self::SendEmail(EmailParams {
            destinatario: destinatario.into(),
            template: template.into(),
            assunto: None,
        })
    }

    /// `criar_alerta`.
    pub fn alert(mensagem: impl Into<String>, prioridade: AlertPriority) -> Self {
        Self::CreateAlert(AlertParams {
            mensagem: mensagem.into(),
            prioridade,
        })
    }

    /// `adicionar_tag`.
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::AddTag(TagParams { tag: tag.into() })
    }

    /// `adicionar_comentario`.
    pub fn comment(texto: impl Into<String>) -> Self {
        Self::AddComment(CommentParams { texto: texto.into() })
    }

    /// `alterar_status`.
    pub fn change_status(status: impl Into<String>) -> Self {
        Self::ChangeStatus(StatusParams {
            status: status.into(),
        })
    }

    /// An action built from a type name and raw parameters.
    ///
    /// A known type name with decodable parameters yields the typed variant.
    /// Otherwise the raw form is kept and [`validate`](Self::validate)
    /// reports what is wrong with it.
    pub fn unregistered(action_type: impl Into<String>, parameters: Map<String, Value>) -> Self {
        let raw = RawAction {
            action_type: action_type.into(),
            parameters,
        };
        if ActionType::from(raw.action_type.as_str()).is_known() {
            if let Ok(action) = Self::try_from(raw.clone()) {
                return action;
            }
        }
        Self::Unregistered {
            action_type: raw.action_type,
            parameters: raw.parameters,
        }
    }

    /// Attach a title to a notification. No effect on other actions.
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        if let Self::SendNotification(params) = &mut self {
            params.titulo = Some(title.into());
        }
        self
    }

    /// Attach a subject to an email. No effect on other actions.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        if let Self::SendEmail(params) = &mut self {
            params.assunto = Some(subject.into());
        }
        self
    }

    /// Handler lookup key.
    pub fn action_type(&self) -> ActionType {
        match self {
            Self::AssignOwner(_) => ActionType::AssignOwner,
            Self::SendNotification(_) => ActionType::SendNotification,
            Self::SendEmail(_) => ActionType::SendEmail,
            Self::CreateAlert(_) => ActionType::CreateAlert,
            Self::AddTag(_) => ActionType::AddTag,
            Self::AddComment(_) => ActionType::AddComment,
            Self::ChangeStatus(_) => ActionType::ChangeStatus,
            Self::Unregistered { action_type, .. } => ActionType::from(action_type.as_str()),
        }
    }

    /// Parameters in wire form.
    pub fn parameters(&self) -> Map<String, Value> {
        match self {
            Self::AssignOwner(p) => to_map(p),
            Self::SendNotification(p) => to_map(p),
            Self::SendEmail(p) => to_map(p),
            Self::CreateAlert(p) => to_map(p),
            Self::AddTag(p) => to_map(p),
            Self::AddComment(p) => to_map(p),
            Self::ChangeStatus(p) => to_map(p),
            Self::Unregistered { parameters, .. } => parameters.clone(),
        }
    }

    /// Check the type name and required parameters.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Self::Unregistered {
            action_type,
            parameters,
        } = self
        {
            if action_type.trim().is_empty() {
                return Err(ValidationError::EmptyActionType);
            }
            if ActionType::from(action_type.as_str()).is_known() {
                // A known name in raw form must still decode into its payload.
                let raw = RawAction {
                    action_type: action_type.clone(),
                    parameters: parameters.clone(),
                };
                return Self::try_from(raw).map(|_| ());
            }
            return Ok(());
        }
        let action_type = self.action_type();
        let parameters = self.parameters();
        for name in action_type.required_parameters() {
            let present = parameters
                .get(*name)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.trim().is_empty());
            if !present {
                return Err(ValidationError::MissingParameter {
                    action_type: action_type.to_string(),
                    parameter: (*name).to_string(),
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.action_type())
    }
}

/// Untyped wire form of an [`Action`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawAction {
    #[serde(rename = "type")]
    action_type: String,
    #[serde(default)]
    parameters: Map<String, Value>,
}

impl TryFrom<RawAction> for Action {
    type Error = ValidationError;

    fn try_from(raw: RawAction) -> Result<Self, Self::Error> {
        if raw.action_type.trim().is_empty() {
            return Err(ValidationError::EmptyActionType);
        }
        let action_type = ActionType::from(raw.action_type.as_str());
        for name in action_type.required_parameters() {
            if !raw.parameters.contains_key(*name) {
                return Err(ValidationError::MissingParameter {
                    action_type: raw.action_type,
                    parameter: (*name).to_string(),
                });
            }
        }
        let params = raw.parameters;
        let action = match action_type {
            ActionType::AssignOwner => Self::AssignOwner(decode(&action_type, params)?),
            ActionType::SendNotification => Self::SendNotification(decode(&action_type, params)?),
            ActionType::SendEmail => Self::SendEmail(decode(&action_type, params)?),
            ActionType::CreateAlert => Self::CreateAlert(decode(&action_type, params)?),
            ActionType::AddTag => Self::AddTag(decode(&action_type, params)?),
            ActionType::AddComment => Self::AddComment(decode(&action_type, params)?),
            ActionType::ChangeStatus => Self::ChangeStatus(decode(&action_type, params)?),
            ActionType::Other(name) => Self::Unregistered {
                action_type: name,
                parameters: params,
            },
        };
        action.validate()?;
        Ok(action)
    }
}

impl From<Action> for RawAction {
    fn from(action: Action) -> Self {
        let parameters = action.parameters();
        let action_type = match action {
            Action::Unregistered { action_type, .. } => action_type,
            known => known.action_type().to_string(),
        };
        Self {
            action_type,
            parameters,
        }
    }
}

fn decode<T: DeserializeOwned>(
    action_type: &ActionType,
    parameters: Map<String, Value>,
) -> Result<T, ValidationError> {
    serde_json::from_value(Value::Object(parameters)).map_err(|e| {
        ValidationError::InvalidParameters {
            action_type: action_type.to_string(),
            reason: e.to_string(),
        }
    })
}

fn to_map<T: Serialize>(params: &T) -> Map<String, Value> {
    match serde_json::to_value(params) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}
