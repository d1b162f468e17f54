use codepro::reflow::{closify, is_html};
use codepro::{minify, prettify, prettify_with, ConfigError, ReflowConfig, UserConfig};

fn validated(user: UserConfig) -> ReflowConfig {
    ReflowConfig::from_user(&user).unwrap()
}

fn no_ignore() -> ReflowConfig {
    validated(UserConfig {
        ignore: Some(Vec::new()),
        ..Default::default()
    })
}

#[test]
fn non_html_is_returned_unchanged() {
    for text in ["", "plain words", "a < b > c", "  \n\tindented\n", "<not closed"] {
        assert!(!is_html(text), "{text:?}");
        assert_eq!(prettify(text, &ReflowConfig::default()), text);
        assert_eq!(prettify(text, &no_ignore()), text);
        assert_eq!(minify(text), text);
    }
}

#[test]
fn hello_div() {
    assert_eq!(
        prettify("<div>Hello</div>", &ReflowConfig::default()),
        "<div>\n  Hello\n</div>"
    );
}

#[test]
fn prettify_twice_changes_nothing() {
    let config = no_ignore();
    for html in [
        "<ul><li>One</li><li>Two <b>2</b></li></ul>",
        "<section>\n\n  <h1>Title</h1>\n<p>Some   text</p>\n</section>",
        "<div><img src=\"a.png\" alt=\"a\"><span></span></div>",
    ] {
        let once = prettify(html, &config);
        assert_eq!(prettify(&once, &config), once, "input: {html}");
    }
}

#[test]
fn strict_prettify_twice_changes_nothing() {
    let config = validated(UserConfig {
        ignore: Some(Vec::new()),
        strict: Some(true),
        ..Default::default()
    });
    for html in [
        "<div>a<!-- c -->b</div>",
        "<p>one<br/><!--\n note\n-->two</p><!-- end -->",
        "<ul><li>x<!-- a --></li><!-- b --><li>y</li></ul>",
    ] {
        let once = prettify(html, &config);
        assert!(!once.contains("<!--"), "{once}");
        assert_eq!(prettify(&once, &config), once, "input: {html}");
    }
}

#[test]
fn slash_closed_tags_count_as_html() {
    for html in ["<br/>", "a<br/>b", "<img/>", "<x/>"] {
        assert!(is_html(html), "{html}");
    }
    assert_eq!(
        prettify("a<br/>b", &ReflowConfig::default()),
        "a\n<br />\nb"
    );
}

#[test]
fn ignored_pre_is_kept_byte_for_byte() {
    let config = validated(UserConfig {
        ignore: Some(vec!["pre".into()]),
        ..Default::default()
    });
    let block = "<pre class=\"code\">\n  fn main() {\n\t  x  }\n</pre>";
    let html = format!("<div>{block}<p>after</p></div>");
    let pretty = prettify(&html, &config);
    assert!(pretty.contains(block), "{pretty}");
    assert!(pretty.starts_with("<div>\n"));
    assert!(pretty.ends_with("\n</div>"));
}

#[test]
fn closify_then_minify() {
    assert_eq!(closify("<br><input type=\"x\">"), "<br /><input type=\"x\" />");
    assert_eq!(
        minify("<ul>\n  <li> a </li>\n  <li>b</li>\n</ul>"),
        "<ul><li>a</li><li>b</li></ul>"
    );
}

#[test]
fn config_is_validated_before_anything_else() {
    let user = UserConfig {
        tab_size: Some(17),
        ..Default::default()
    };
    assert_eq!(
        prettify_with("<p>x</p>", &user),
        Err(ConfigError::IndentOutOfRange(17))
    );

    let user = UserConfig::from_toml("tab_size = 3\nignore = []\n").unwrap();
    assert_eq!(
        prettify_with("<p><b>x</b></p>", &user).unwrap(),
        "<p>\n   <b>\n      x\n   </b>\n</p>"
    );
}
