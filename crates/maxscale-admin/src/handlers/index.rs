use axum::response::Html;

use crate::router::METRICS_PATH;

pub async fn index_page() -> Html<String> {
    Html(format!(
        "<html>\n\
         <head><title>MaxScale Exporter</title></head>\n\
         <body>\n\
         <h1>MaxScale Exporter</h1>\n\
         <p><a href=\"{METRICS_PATH}\">Metrics</a></p>\n\
         </body>\n\
         </html>\n"
    ))
}
