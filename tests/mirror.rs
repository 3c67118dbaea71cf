use assert_matches::assert_matches;
use url::Url;

use paperfetch::error::FailureKind;
use paperfetch::mirror::{normalize_link, scrape_result_page};

fn base() -> Url {
    Url::parse("https://sci-hub.se").unwrap()
}

fn result_page(title: &str, src: &str) -> String {
    format!(
        "<html><head><title>{title}</title></head>\
         <body><div id=\"article\"><embed id=\"pdf\" src=\"{src}\"/></div></body></html>"
    )
}

#[test]
fn resolves_root_relative_download_link() {
    let html = result_page("Sci-Hub | A study of things", "/download/2019/doc.pdf#view=FitH");
    let resolved = scrape_result_page(&html, &base()).unwrap();
    assert_eq!(resolved.title.as_deref(), Some("A study of things"));
    assert_eq!(
        resolved.download_url,
        "https://sci-hub.se/download/2019/doc.pdf"
    );
}

#[test]
fn resolves_protocol_relative_link() {
    let html = result_page("Sci-Hub | Another study", "//cdn.example.org/doc.pdf#page=2");
    let resolved = scrape_result_page(&html, &base()).unwrap();
    assert_eq!(resolved.download_url, "https://cdn.example.org/doc.pdf");
}

#[test]
fn not_found_marker_wins_over_link_extraction() {
    // A download element is present, but the title says the document is
    // not mirrored; that signal must be honored first.
    let html = result_page("Sci-Hub | article not found", "/download/doc.pdf");
    let err = scrape_result_page(&html, &base()).unwrap_err();
    assert_eq!(err, FailureKind::NotFound);
}

#[test]
fn missing_title_is_a_parse_error() {
    let html = "<html><body><div id=\"article\"><embed id=\"pdf\" src=\"/download/x\"/></div></body></html>";
    let err = scrape_result_page(html, &base()).unwrap_err();
    assert_matches!(err, FailureKind::Parse(_));
}

#[test]
fn missing_pdf_element_is_a_parse_error() {
    let html = "<html><head><title>Sci-Hub | A study</title></head><body><div id=\"article\"></div></body></html>";
    let err = scrape_result_page(html, &base()).unwrap_err();
    assert_matches!(err, FailureKind::Parse(_));
}

#[test]
fn pdf_element_outside_article_is_a_parse_error() {
    let html = "<html><head><title>Sci-Hub | A study</title></head>\
                <body><embed id=\"pdf\" src=\"/download/x.pdf\"/></body></html>";
    let err = scrape_result_page(html, &base()).unwrap_err();
    assert_matches!(err, FailureKind::Parse(_));
}

#[test]
fn missing_src_attribute_is_a_parse_error() {
    let html = "<html><head><title>Sci-Hub | A study</title></head>\
                <body><div id=\"article\"><embed id=\"pdf\"/></div></body></html>";
    let err = scrape_result_page(html, &base()).unwrap_err();
    assert_matches!(err, FailureKind::Parse(_));
}

#[test]
fn unexpected_link_shape_is_unresolved() {
    let html = result_page("Sci-Hub | A study", "relative/path.pdf");
    let err = scrape_result_page(&html, &base()).unwrap_err();
    assert_matches!(err, FailureKind::UnresolvedLink(_));
}

#[test]
fn absolute_links_are_not_guessed_at() {
    let err = normalize_link("https://elsewhere.example.org/doc.pdf", &base()).unwrap_err();
    assert_matches!(err, FailureKind::UnresolvedLink(_));
}

#[test]
fn normalize_prefixes_download_route_with_mirror_host() {
    let url = normalize_link("/download/doc.pdf", &base()).unwrap();
    assert_eq!(url, "https://sci-hub.se/download/doc.pdf");
}

#[test]
fn normalize_prefixes_protocol_relative_with_scheme_only() {
    let url = normalize_link("//host.example/doc.pdf", &base()).unwrap();
    assert_eq!(url, "https://host.example/doc.pdf");
}

#[test]
fn title_without_prefix_still_resolves() {
    let html = result_page("Unprefixed title", "/download/doc.pdf");
    let resolved = scrape_result_page(&html, &base()).unwrap();
    assert_eq!(resolved.title, None);
    assert_eq!(resolved.download_url, "https://sci-hub.se/download/doc.pdf");
}
