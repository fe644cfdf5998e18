pub mod analysis;
pub mod channel;
pub mod config;
pub mod error;
pub mod export;
pub mod line;
pub mod record;
pub mod runtime;
pub mod sample;
pub mod session;
pub mod store;
pub mod transport;
pub mod view;

pub use analysis::{AnalysisLocale, AnalysisRequest, AnalysisService, AnalysisState};
pub use channel::{channel_key, Channel, ChannelRegistry};
pub use config::{BaudRate, ChartConfig, TimeDisplay, YScale};
pub use error::{AnalysisError, Rejection, TransportError};
pub use export::{render_csv, write_csv};
pub use line::{LineAssembler, MAX_PENDING_BYTES};
pub use record::parse_record;
pub use runtime::SessionHandle;
pub use sample::{stamp, Sample};
pub use session::{IngestionSession, SessionState};
pub use store::{SeriesStore, MAX_SAMPLES};
pub use transport::{
    CancelToken, ReadOutcome, ScriptedTransport, SerialTransport, SimulatedTransport, Transport,
};
pub use view::{chart_view, ChartSeries, ChartView};
