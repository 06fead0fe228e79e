use crate::config::Config;
use crate::error::MailError;
use crate::model::leave::LeaveRecord;
use handlebars::Handlebars;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use once_cell::sync::Lazy;

const AVISO_TEMPLATE: &str = include_str!("../templates/aviso_ferias.hbs");

static TEMPLATES: Lazy<Handlebars<'static>> = Lazy::new(|| {
    let mut hb = Handlebars::new();
    hb.register_template_string("aviso_ferias", AVISO_TEMPLATE)
        .expect("aviso_ferias template must compile");
    hb
});

/// Outbound e-mail seam. One HTML message per notified lotação.
pub trait Mailer {
    async fn send_html(&self, to: &str, subject: &str, html: String) -> Result<(), MailError>;
}

/// Renders the notice body for one lotação.
pub fn render_aviso(
    nome_chefe: &str,
    codigo_lotacao: &str,
    competencia: &str,
    servidores: &[LeaveRecord],
) -> Result<String, MailError> {
    let context = serde_json::json!({
        "nome_chefe": nome_chefe,
        "codigo_lotacao": codigo_lotacao,
        "competencia": competencia,
        "servidores": servidores,
    });

    TEMPLATES
        .render("aviso_ferias", &context)
        .map_err(MailError::Render)
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Plain SMTP against the configured relay, with credentials when both
    /// username and password are present.
    pub fn new(config: &Config) -> Result<Self, MailError> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from: config.email_from.parse()?,
        })
    }
}

impl Mailer for SmtpMailer {
    async fn send_html(&self, to: &str, subject: &str, html: String) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)?;

        self.transport.send(message).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(nome: &str, matricula: &str) -> LeaveRecord {
        LeaveRecord {
            id: 0,
            nome_servidor: nome.to_string(),
            matricula: matricula.to_string(),
            codigo_lotacao: "10087".to_string(),
            inicio_das_ferias: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            fim_das_ferias: NaiveDate::from_ymd_opt(2025, 8, 15).unwrap(),
            quantidade_dias_ferias: 15,
            competencia: "2025-08".to_string(),
        }
    }

    #[test]
    fn renders_header_fields_and_every_record() {
        let servidores = vec![record("Maria da Silva", "12345"), record("João Souza", "67890")];

        let html = render_aviso("Ana Chefe", "10087", "2025-08", &servidores).unwrap();

        assert!(html.contains("Ana Chefe"));
        assert!(html.contains("10087"));
        assert!(html.contains("2025-08"));
        assert!(html.contains("Maria da Silva"));
        assert!(html.contains("João Souza"));
        assert!(html.contains("2025-08-01"));
    }

    #[test]
    fn renders_empty_table_without_records() {
        let html = render_aviso("Ana Chefe", "10087", "2025-08", &[]).unwrap();
        assert!(html.contains("<tbody>"));
        assert!(!html.contains("<td>"));
    }
}
