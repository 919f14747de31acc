//! Desktop toast notifications.
//!
//! Only Windows has a toast implementation (via the PowerShell toast API);
//! on other platforms [`DesktopToastNotifier::supported`] reports false and
//! the notifier is never registered. Delivery is best-effort: a failed
//! toast is reported in the dispatch results and nothing else.

use async_trait::async_trait;

use crate::plugins::traits::{NotificationResult, Notifier, PriceAlert};

pub struct DesktopToastNotifier;

impl DesktopToastNotifier {
    pub fn new() -> Self {
        DesktopToastNotifier
    }

    /// Whether the running platform can show toasts at all. Probed once at
    /// startup when the notifier set is assembled.
    pub fn supported() -> bool {
        cfg!(target_os = "windows")
    }
}

impl Default for DesktopToastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "windows")]
fn show_toast(title: &str, body: &str) -> std::io::Result<std::process::ExitStatus> {
    use std::process::Command;

    // Escape for single-quoted PowerShell string literals.
    let ps_quote = |s: &str| s.replace('\'', "''");
    let script = format!(
        r#"
[Windows.UI.Notifications.ToastNotificationManager, Windows.UI.Notifications, ContentType = WindowsRuntime] | Out-Null
$xml = [Windows.UI.Notifications.ToastNotificationManager]::GetTemplateContent([Windows.UI.Notifications.ToastTemplateType]::ToastText02)
$texts = $xml.GetElementsByTagName('text')
$texts.Item(0).AppendChild($xml.CreateTextNode('{title}')) | Out-Null
$texts.Item(1).AppendChild($xml.CreateTextNode('{body}')) | Out-Null
$toast = [Windows.UI.Notifications.ToastNotification]::new($xml)
[Windows.UI.Notifications.ToastNotificationManager]::CreateToastNotifier('PriceWatch').Show($toast)
"#,
        title = ps_quote(title),
        body = ps_quote(body),
    );

    Command::new("powershell")
        .args(["-NoProfile", "-NonInteractive", "-Command", &script])
        .status()
}

#[cfg(not(target_os = "windows"))]
fn show_toast(_title: &str, _body: &str) -> std::io::Result<std::process::ExitStatus> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "desktop toasts are only available on Windows",
    ))
}

#[async_trait]
impl Notifier for DesktopToastNotifier {
    fn name(&self) -> &str {
        "desktop-toast"
    }

    async fn notify(
        &self,
        alert: &PriceAlert,
    ) -> Result<NotificationResult, Box<dyn std::error::Error + Send + Sync>> {
        match show_toast(alert.subject(), &alert.body()) {
            Ok(status) if status.success() => Ok(NotificationResult::sent()),
            Ok(status) => Ok(NotificationResult::failed(format!(
                "toast helper exited with {}",
                status
            ))),
            Err(e) => Ok(NotificationResult::failed(e.to_string())),
        }
    }
}
