//! Plain-text rendering of client results.

use factfund_client::{Balance, Profile, ProposalView};
use factfund_ledger::ClassifiedTransaction;
use factfund_types::FileMeta;
use factfund_utils::format_timestamp;

pub fn balance(balance: &Balance) -> String {
    format!(
        "Total:     {}\nLocked:    {}\nAvailable: {}",
        balance.total, balance.locked, balance.available
    )
}

pub fn profile(profile: &Profile) -> String {
    let mut out = format!(
        "Principal: {}\nAccount:   {}\n{}\n",
        profile.user.principal,
        profile.user.account_id,
        balance(&profile.balance)
    );
    if profile.transactions.is_empty() {
        out.push_str("\nNo transactions.");
    } else {
        out.push_str("\nRecent transactions:");
        for tx in &profile.transactions {
            out.push('\n');
            out.push_str(&transaction(tx));
        }
    }
    out
}

pub fn transaction(tx: &ClassifiedTransaction) -> String {
    format!(
        "  {}  {:<8}  {:>22}  {} -> {}",
        format_timestamp(tx.timestamp),
        tx.kind.label(),
        tx.amount.to_string(),
        short(&tx.from),
        short(&tx.to)
    )
}

pub fn proposal_line(view: &ProposalView) -> String {
    let status = if view.is_claimed() { "  [claimed]" } else { "" };
    format!(
        "{:>5}  {:>3}%  {} of {}  {}{}",
        view.id().to_string(),
        view.progress_percent(),
        view.raised,
        view.required(),
        view.proposal.title,
        status
    )
}

pub fn proposal(view: &ProposalView, files: &[FileMeta]) -> String {
    let p = &view.proposal;
    let mut out = format!(
        "{} {}\nBy:        {} ({})\nAccount:   {}\nRaised:    {} of {} ({}%)\nRemaining: {}\nClaim:     {:?}\n\n{}\n",
        p.id,
        p.title,
        p.name,
        p.created_by,
        p.account_id,
        view.raised,
        view.required(),
        view.progress_percent(),
        view.remaining(),
        view.claim,
        p.description
    );
    if !p.donations.is_empty() {
        out.push_str(&format!("\nDonations ({}):", p.donations.len()));
        for d in &p.donations {
            out.push_str(&format!("\n  {}  {}", short(&d.account), d.amount.e8s));
        }
        out.push('\n');
    }
    out.push_str(&files_list(files));
    out
}

pub fn files_list(files: &[FileMeta]) -> String {
    if files.is_empty() {
        return "\nNo files.".to_string();
    }
    let mut out = String::from("\nFiles:");
    for f in files {
        out.push_str(&format!("\n  {}  ({})", f.name, f.file_type));
    }
    out
}

/// Shorten a long account identifier for table output.
fn short(account: &str) -> String {
    if account.len() > 16 && account.is_ascii() {
        format!("{}..{}", &account[..8], &account[account.len() - 6..])
    } else {
        account.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_accounts_are_shortened() {
        let account = "ab".repeat(32);
        assert_eq!(short(&account), "abababab..ababab");
        assert_eq!(short("Minting Account"), "Minting Account");
    }

    #[test]
    fn balance_lists_three_lines() {
        let b = Balance::derive(
            factfund_types::E8s::from_tokens(2),
            factfund_types::E8s::ZERO,
        );
        assert_eq!(balance(&b).lines().count(), 3);
    }
}
