use codepro::caret::bridge::MARKER_SPAN;
use codepro::{
    locate_marker, prettify, CaretSync, History, MarkerStrategy, ReflowConfig, SourceBuffer,
    SourceViewOptions, SyncMode, SyntaxTree,
};

fn boundaries(s: &str) -> impl Iterator<Item = usize> + '_ {
    (0..=s.len()).filter(|&i| s.is_char_boundary(i))
}

#[test]
fn marker_round_trips_at_every_offset() {
    let sync = CaretSync::default();
    let doc = "<!doctype html><p class=\"x\">Grüße, <b>wörld</b></p><script>a<b</script>";
    for cursor in boundaries(doc) {
        let marked = sync.value_with_marker_at_cursor(doc, cursor);
        let caret = sync.scroll_to_caret_position(&marked);
        assert_eq!(caret.text, doc);
        assert_eq!(caret.offset, Some(cursor));
    }
}

#[test]
fn element_placement_only_ever_adds_the_marker() {
    let sync = CaretSync::default();
    let doc = "<ul><li>one<li>two</ul><img src=\"a.png\"><!-- c --><p>end";
    let tree = SyntaxTree::parse(doc);
    for cursor in 0..=doc.len() {
        let marked = sync.value_with_marker_at_element(&tree, doc, cursor);
        let caret = sync.scroll_to_caret_position(&marked);
        assert_eq!(caret.text, doc, "cursor {cursor}");
        assert!(marked.len() <= doc.len() + 1);
    }
}

#[test]
fn marker_never_lands_inside_raw_text_or_tags() {
    let sync = CaretSync::default();
    let doc = r#"<p>a</p><script>var x = "<b>";</script><a href="x y">z</a>"#;
    let tree = SyntaxTree::parse(doc);

    let script = (doc.find("<script>").unwrap(), doc.find("</script>").unwrap() + 9);
    let a_open = (doc.find("<a ").unwrap(), doc.find(">z").unwrap() + 1);
    let tags = [(0, 3), (4, 8), a_open, (doc.len() - 4, doc.len())];

    for cursor in 0..=doc.len() {
        let marked = sync.value_with_marker(&tree, doc, cursor, MarkerStrategy::AtElement);
        let Some(m) = locate_marker(&marked, sync.marker()) else {
            continue;
        };
        assert!(
            !(script.0 < m && m < script.1),
            "cursor {cursor} put the marker at {m} inside <script>"
        );
        for (from, to) in tags {
            assert!(
                !(from < m && m < to),
                "cursor {cursor} put the marker at {m} inside the tag at {from}..{to}"
            );
        }
    }
}

#[test]
fn documented_scenarios() {
    let sync = CaretSync::default();

    let doc = "<div>Hello world</div>";
    let tree = SyntaxTree::parse(doc);
    let at = |cursor| {
        let marked = sync.value_with_marker_at_element(&tree, doc, cursor);
        locate_marker(&marked, sync.marker())
    };
    assert_eq!(at(0), Some(0));
    assert_eq!(at(17), Some(16));

    let doc = "<div><he></he></div>";
    let tree = SyntaxTree::parse(doc);
    for cursor in [6, 7, 8] {
        let marked = sync.value_with_marker_at_element(&tree, doc, cursor);
        assert_eq!(locate_marker(&marked, sync.marker()), Some(5));
    }

    let doc = "<style>.x{color:red}</style>\n<p>first <b>bold</b></p>";
    let tree = SyntaxTree::parse(doc);
    let marked = sync.value_with_marker_at_element(&tree, doc, 12);
    assert_eq!(locate_marker(&marked, sync.marker()), Some(0));
}

#[test]
fn caret_survives_prettify() {
    let sync = CaretSync::default();
    let config = ReflowConfig::default();
    let doc = "<div>Hello world</div>";
    let expected = prettify(doc, &config);
    for cursor in 5..=16 {
        let marked = sync.value_with_marker(
            &SyntaxTree::parse(doc),
            doc,
            cursor,
            MarkerStrategy::AtElement,
        );
        let pretty = prettify(&marked, &config);
        let caret = sync.scroll_to_caret_position(&pretty);
        assert_eq!(caret.text, expected, "cursor {cursor}");
        let offset = caret.offset.unwrap();
        assert_eq!(
            &expected[offset - (cursor - 5)..offset],
            &doc[5..cursor],
            "cursor {cursor}"
        );
    }
}

#[test]
fn bridge_round_trip() {
    let sync = CaretSync::default();
    let options = SourceViewOptions {
        sync: SyncMode::Both,
        ..Default::default()
    };
    let rich = r#"<p>Hi<span class="tcp_CmCaReT" data-mce-bogus="1">&nbsp;</span></p>"#;

    let mut buffer = sync.open_source_view(rich, &options).unwrap();
    assert_eq!(buffer.text(), "<p>\n  Hi\n</p>");
    assert_eq!(buffer.cursor(), 8);

    let back = sync.accept_source_view(&mut buffer, &options).unwrap();
    assert_eq!(back, format!("<p>\n  Hi{MARKER_SPAN}\n</p>"));
}

#[test]
fn probing_the_buffer_does_not_touch_history() {
    let sync = CaretSync::default();
    let mut buffer = SourceBuffer::new("<p>ab</p>");
    buffer.insert(5, "c", History::Record).unwrap();
    buffer.set_cursor(6);

    for strategy in [MarkerStrategy::AtCursor, MarkerStrategy::AtElement] {
        let value = sync.buffer_value_with_marker(&mut buffer, strategy).unwrap();
        assert_eq!(value, "<p>abc\0</p>");
    }
    assert_eq!(buffer.text(), "<p>abc</p>");

    assert!(buffer.undo());
    assert_eq!(buffer.text(), "<p>ab</p>");
    assert!(!buffer.can_undo());
}
