//! Renders a [`Notice`] into a branded HTML email plus a plain-text
//! alternative. Subjects and body fields are part of the product surface;
//! change them deliberately.

use crate::config::MailConfig;
use crate::notify::{Notice, TransferDetails};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct RenderedMail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

struct Shell<'a> {
    preheader: String,
    title: String,
    lead: String,
    rows: Vec<(&'static str, String)>,
    cta_label: &'a str,
    cta_url: String,
    footer_note: String,
}

pub fn render(notice: &Notice, mail: &MailConfig) -> RenderedMail {
    match notice {
        Notice::Welcome { email, first_name } => {
            let name = first_name.as_deref().unwrap_or("there");
            let shell = Shell {
                preheader: format!("Your {} account is ready.", mail.brand),
                title: format!("Welcome to {}", mail.brand),
                lead: format!(
                    "Hi {name}, your account is set up and ready to go. \
                     Sign in to make your first deposit and start earning."
                ),
                rows: vec![("Account", email.clone())],
                cta_label: "Open your dashboard",
                cta_url: mail.dashboard_url.clone(),
                footer_note: format!(
                    "You are receiving this because an account was created for {email}."
                ),
            };
            RenderedMail {
                subject: format!("Welcome to {}", mail.brand),
                html: shell.html(mail),
                text: shell.text(),
            }
        }
        Notice::DepositPending { email, details } => {
            let shell = Shell {
                preheader: format!(
                    "We received your {} deposit of ${}.",
                    details.coin,
                    money(details.amount)
                ),
                title: "Deposit received".to_string(),
                lead: "Hi, we received your deposit and it is pending network \
                       confirmation. We will email you again once it is credited."
                    .to_string(),
                rows: transfer_rows(details),
                cta_label: "View deposit",
                cta_url: format!("{}/deposits/{}", mail.dashboard_url, details.id),
                footer_note: sent_to(email),
            };
            RenderedMail {
                subject: "Deposit received — pending confirmation".to_string(),
                html: shell.html(mail),
                text: shell.text(),
            }
        }
        Notice::DepositStatus {
            email,
            status,
            details,
        } => {
            let pretty = ucfirst(status);
            let lead = if status == "approved" {
                format!(
                    "Good news: your {} deposit of ${} has been approved \
                     and credited to your balance.",
                    details.coin,
                    money(details.amount)
                )
            } else {
                format!(
                    "Your {} deposit of ${} was not approved. \
                     See the note below or contact support for details.",
                    details.coin,
                    money(details.amount)
                )
            };
            let shell = Shell {
                preheader: format!("Your deposit #{} is {}.", details.id, status),
                title: format!("Deposit {pretty}"),
                lead,
                rows: transfer_rows(details),
                cta_label: "View deposit",
                cta_url: format!("{}/deposits/{}", mail.dashboard_url, details.id),
                footer_note: sent_to(email),
            };
            RenderedMail {
                subject: format!("Deposit {pretty}"),
                html: shell.html(mail),
                text: shell.text(),
            }
        }
        Notice::WithdrawalPending { email, details } => {
            let shell = Shell {
                preheader: format!(
                    "We received your {} withdrawal request of ${}.",
                    details.coin,
                    money(details.amount)
                ),
                title: "Withdrawal received".to_string(),
                lead: "Hi, we received your withdrawal request and it is pending \
                       approval. We will email you once it has been processed."
                    .to_string(),
                rows: transfer_rows(details),
                cta_label: "View withdrawal",
                cta_url: format!("{}/withdrawals/{}", mail.dashboard_url, details.id),
                footer_note: sent_to(email),
            };
            RenderedMail {
                subject: "Withdrawal received — pending approval".to_string(),
                html: shell.html(mail),
                text: shell.text(),
            }
        }
        Notice::WithdrawalStatus {
            email,
            status,
            details,
        } => {
            let pretty = ucfirst(status);
            let lead = if status == "approved" {
                format!(
                    "Your {} withdrawal of ${} has been approved and sent. \
                     The transaction reference is included below.",
                    details.coin,
                    money(details.amount)
                )
            } else {
                format!(
                    "Your {} withdrawal of ${} was not approved and no funds \
                     left your balance. See the note below for details.",
                    details.coin,
                    money(details.amount)
                )
            };
            let shell = Shell {
                preheader: format!("Your withdrawal #{} is {}.", details.id, status),
                title: format!("Withdrawal {pretty}"),
                lead,
                rows: transfer_rows(details),
                cta_label: "View withdrawal",
                cta_url: format!("{}/withdrawals/{}", mail.dashboard_url, details.id),
                footer_note: sent_to(email),
            };
            RenderedMail {
                subject: format!("Withdrawal {pretty}"),
                html: shell.html(mail),
                text: shell.text(),
            }
        }
        Notice::AdminDepositAlert {
            user_email,
            details,
            ..
        } => admin_alert("deposit", "deposits", user_email, details, mail),
        Notice::AdminWithdrawalAlert {
            user_email,
            details,
            ..
        } => admin_alert("withdrawal", "withdrawals", user_email, details, mail),
    }
}

fn admin_alert(
    kind: &str,
    path: &str,
    user_email: &str,
    details: &TransferDetails,
    mail: &MailConfig,
) -> RenderedMail {
    let mut rows = vec![("User", user_email.to_string())];
    rows.extend(transfer_rows(details));
    let shell = Shell {
        preheader: format!("A new {kind} is waiting for review."),
        title: format!("New {kind} submitted"),
        lead: format!(
            "{user_email} submitted a {} {kind} of ${}. It is pending review.",
            details.coin,
            money(details.amount)
        ),
        rows,
        cta_label: "Review in admin",
        cta_url: format!("{}/admin/{path}/pending", mail.dashboard_url),
        footer_note: "Internal alert for operations staff.".to_string(),
    };
    RenderedMail {
        subject: format!(
            "New {kind} — #{} ({} ${})",
            details.id,
            details.coin,
            money(details.amount)
        ),
        html: shell.html(mail),
        text: shell.text(),
    }
}

fn transfer_rows(d: &TransferDetails) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("ID", format!("#{}", d.id)),
        ("Coin", d.coin.clone()),
        ("Amount", format!("${}", money(d.amount))),
    ];
    if let Some(fee) = d.fee {
        rows.push(("Fee", format!("${}", money(fee))));
    }
    if let Some(addr) = &d.address {
        rows.push(("Address", addr.clone()));
    }
    if let Some(txid) = &d.txid {
        rows.push(("TXID", txid.clone()));
    }
    if let Some(note) = &d.note {
        if !note.is_empty() {
            rows.push(("Note", note.clone()));
        }
    }
    rows.push(("Date", dateish(d.at)));
    rows
}

fn sent_to(email: &str) -> String {
    format!("This message was sent to {email}.")
}

impl Shell<'_> {
    fn html(&self, mail: &MailConfig) -> String {
        let rows_html: String = self
            .rows
            .iter()
            .map(|(label, value)| {
                format!(
                    "<tr>\
                     <td style=\"padding:6px 12px 6px 0;color:#8b95a5;font-size:13px;\">{}</td>\
                     <td style=\"padding:6px 0;color:#e6ebf2;font-size:13px;word-break:break-all;\">{}</td>\
                     </tr>",
                    label,
                    escape(value)
                )
            })
            .collect();
        format!(
            "<!doctype html><html><body style=\"margin:0;background:#0b0f14;\
             font-family:-apple-system,Segoe UI,Roboto,Helvetica,Arial,sans-serif;\">\
             <span style=\"display:none;max-height:0;overflow:hidden;\">{preheader}</span>\
             <table role=\"presentation\" width=\"100%\" cellpadding=\"0\" cellspacing=\"0\">\
             <tr><td align=\"center\" style=\"padding:32px 16px;\">\
             <table role=\"presentation\" width=\"520\" cellpadding=\"0\" cellspacing=\"0\" \
             style=\"background:#121821;border:1px solid #1e2733;border-radius:12px;\">\
             <tr><td style=\"padding:24px 28px 8px;\">\
             <div style=\"color:#4f8cff;font-weight:700;font-size:14px;letter-spacing:1px;\">{brand}</div>\
             <h1 style=\"margin:12px 0 0;color:#e6ebf2;font-size:20px;\">{title}</h1>\
             </td></tr>\
             <tr><td style=\"padding:8px 28px;color:#aeb8c6;font-size:14px;line-height:1.6;\">{lead}</td></tr>\
             <tr><td style=\"padding:8px 28px;\">\
             <table role=\"presentation\" width=\"100%\" cellpadding=\"0\" cellspacing=\"0\" \
             style=\"background:#0e141c;border-radius:8px;padding:8px 16px;\">{rows}</table>\
             </td></tr>\
             <tr><td style=\"padding:16px 28px 8px;\">\
             <a href=\"{cta_url}\" style=\"display:inline-block;background:#4f8cff;color:#0b0f14;\
             text-decoration:none;font-weight:600;font-size:14px;padding:10px 20px;border-radius:8px;\">{cta}</a>\
             </td></tr>\
             <tr><td style=\"padding:16px 28px 24px;color:#6b7685;font-size:12px;\">{footer}</td></tr>\
             </table>\
             <div style=\"color:#6b7685;font-size:12px;padding:16px;\">&copy; {brand}</div>\
             </td></tr></table></body></html>",
            preheader = escape(&self.preheader),
            brand = escape(&mail.brand),
            title = escape(&self.title),
            lead = escape(&self.lead),
            rows = rows_html,
            cta_url = self.cta_url,
            cta = escape(self.cta_label),
            footer = escape(&self.footer_note),
        )
    }

    fn text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push_str("\n\n");
        out.push_str(&self.lead);
        out.push_str("\n\n");
        for (label, value) in &self.rows {
            out.push_str(&format!("{label}: {value}\n"));
        }
        out.push('\n');
        out.push_str(&format!("{}: {}\n", self.cta_label, self.cta_url));
        out
    }
}

/// Two-decimal amount with thousands separators, e.g. `12,500.00`.
pub(crate) fn money(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.round_dp(2));
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let (sign, digits) = int_part
        .strip_prefix('-')
        .map_or(("", int_part), |rest| ("-", rest));
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}.{frac_part}")
}

fn dateish(at: DateTime<Utc>) -> String {
    at.format("%b %d, %Y %H:%M UTC").to_string()
}

fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn mail_config() -> MailConfig {
        MailConfig {
            endpoint: "https://mail.example.com".into(),
            api_key: "k".into(),
            from: "no-reply@example.com".into(),
            brand: "CryptoPrime".into(),
            dashboard_url: "https://app.example.com".into(),
            admin_alert_emails: vec![],
        }
    }

    fn details() -> TransferDetails {
        TransferDetails {
            id: 42,
            coin: "BTC".into(),
            amount: dec("1250.5"),
            fee: None,
            address: Some("bc1qexample".into()),
            txid: None,
            note: None,
            at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(dec("1250.5")), "1,250.50");
        assert_eq!(money(dec("999")), "999.00");
        assert_eq!(money(dec("1234567.891")), "1,234,567.89");
        assert_eq!(money(dec("-4200")), "-4,200.00");
    }

    #[test]
    fn deposit_status_subject_capitalizes_status() {
        let notice = Notice::DepositStatus {
            email: "u@example.com".into(),
            status: "approved".into(),
            details: details(),
        };
        let mail = render(&notice, &mail_config());
        assert_eq!(mail.subject, "Deposit Approved");
        assert!(mail.html.contains("$1,250.50"));
        assert!(mail.text.contains("ID: #42"));
    }

    #[test]
    fn admin_alert_subject_includes_id_and_amount() {
        let notice = Notice::AdminWithdrawalAlert {
            admin_to: "ops@example.com".into(),
            user_email: "u@example.com".into(),
            details: details(),
        };
        let mail = render(&notice, &mail_config());
        assert_eq!(mail.subject, "New withdrawal — #42 (BTC $1,250.50)");
        assert!(mail.html.contains("u@example.com"));
    }

    #[test]
    fn welcome_links_to_dashboard() {
        let notice = Notice::Welcome {
            email: "new@example.com".into(),
            first_name: Some("Ada".into()),
        };
        let mail = render(&notice, &mail_config());
        assert_eq!(mail.subject, "Welcome to CryptoPrime");
        assert!(mail.html.contains("https://app.example.com"));
        assert!(mail.text.contains("Hi Ada"));
    }

    #[test]
    fn html_escapes_user_content() {
        let mut d = details();
        d.note = Some("<script>alert(1)</script>".into());
        let notice = Notice::DepositPending {
            email: "u@example.com".into(),
            details: d,
        };
        let mail = render(&notice, &mail_config());
        assert!(!mail.html.contains("<script>"));
        assert!(mail.html.contains("&lt;script&gt;"));
    }
}
