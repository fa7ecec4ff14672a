use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const TEMPLATE: &str = "{spinner:.green} [{elapsed}] [{bar:.blue}] {human_pos}/{human_len} {wide_msg}";

/// Build a progress bar over `total_payloads`; a single payload gets a hidden bar
pub fn build_progress_bar_decode(total_payloads: u64) -> ProgressBar {
    if total_payloads < 2 {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::with_draw_target(Some(total_payloads), ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_bar()
            .template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_position(0);
    pb
}

#[cfg(test)]
mod tests {
    use crate::app::progress::build_progress_bar_decode;

    #[test]
    fn can_hide_single_payload_bar() {
        assert!(build_progress_bar_decode(1).is_hidden());
    }

    #[test]
    fn can_track_many_payloads() {
        let pb = build_progress_bar_decode(3);
        pb.inc(2);

        assert_eq!(pb.length(), Some(3));
        assert_eq!(pb.position(), 2);
    }
}
