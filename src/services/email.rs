use lettre::{
    Message, SmtpTransport, Transport,
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
};
use log::{error, info, warn};

pub struct EmailService;

impl EmailService {
    /// Deliver the deletion code. A failure here must abort issuance, so the
    /// error is returned instead of being swallowed.
    pub async fn send_verification_code(email: &str, code: &str) -> Result<(), String> {
        match Self::try_send_code(email, code).await {
            Ok(_) => {
                info!("Verification code email sent to {}", email);
                Ok(())
            }
            Err(e) => {
                error!("Failed to send verification code to {}: {}", email, e);
                Err(e.to_string())
            }
        }
    }

    async fn try_send_code(email: &str, code: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mail_user = crate::config::Config::mail_user();
        let mail_password = crate::config::Config::mail_password();

        if mail_user.is_empty() || mail_password.is_empty() {
            warn!("Email credentials not configured. Skipping email send.");
            return Err("Email not configured".into());
        }

        let from_mailbox: Mailbox = crate::config::Config::mail_from().parse()?;
        let to_mailbox: Mailbox = email.parse()?;

        let email_body = format!(
            r#"
            <div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
                <h2>Solicitud de eliminación de cuenta</h2>
                <p>Hola,</p>
                <p>Has solicitado eliminar tu cuenta. Para continuar con el proceso, ingresa el siguiente código:</p>
                <div style="background-color: #f0f0f0; padding: 20px; text-align: center; margin: 20px 0; border-radius: 5px;">
                    <h1 style="color: #333; letter-spacing: 5px; font-size: 32px; margin: 0;">{}</h1>
                </div>
                <p><strong>Este código es válido por 30 minutos.</strong></p>
                <p style="color: #666; font-size: 12px;">Si no solicitaste eliminar tu cuenta, ignora este mensaje.</p>
                <hr>
                <p style="color: #999; font-size: 11px;">Este es un mensaje automatizado, por favor no respondas a este correo.</p>
            </div>
            "#,
            code
        );

        let email_message = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject("Código de verificación para eliminar tu cuenta")
            .header(ContentType::TEXT_HTML)
            .body(email_body)?;

        let creds = Credentials::new(mail_user, mail_password);
        let mailer = SmtpTransport::relay(&crate::config::Config::mail_host())?
            .credentials(creds)
            .build();

        mailer.send(&email_message)?;
        Ok(())
    }
}
