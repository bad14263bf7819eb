use std::fmt::Write;

/// One statistic column of the result table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Statistic {
    Area,
    Mean,
    Min,
    Max,
    IntegratedDensity,
    RawIntegratedDensity,
}

impl Statistic {
    /// Column header.
    pub fn header(self) -> &'static str {
        match self {
            Self::Area => "Area",
            Self::Mean => "Mean",
            Self::Min => "Min",
            Self::Max => "Max",
            Self::IntegratedDensity => "IntDen",
            Self::RawIntegratedDensity => "RawIntDen",
        }
    }
}

/// Statistics of one region in one channel.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasurementRecord {
    pub region_id: u32,
    /// 1-based channel index.
    pub channel: usize,
    /// Pixel count, or calibrated area when the image has a calibration.
    pub area: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// mean × area.
    pub integrated_density: f64,
    /// Sum of pixel values.
    pub raw_integrated_density: f64,
}

impl MeasurementRecord {
    pub fn value(&self, stat: Statistic) -> f64 {
        match stat {
            Statistic::Area => self.area,
            Statistic::Mean => self.mean,
            Statistic::Min => self.min,
            Statistic::Max => self.max,
            Statistic::IntegratedDensity => self.integrated_density,
            Statistic::RawIntegratedDensity => self.raw_integrated_density,
        }
    }
}

/// Measurements for one image: channel-major, region id ascending within each
/// channel.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultTable {
    pub records: Vec<MeasurementRecord>,
    pub columns: Vec<Statistic>,
    pub precision: usize,
}

impl ResultTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records belonging to one channel.
    pub fn channel(&self, channel: usize) -> impl Iterator<Item = &MeasurementRecord> {
        self.records.iter().filter(move |r| r.channel == channel)
    }

    /// Header line.
    pub fn header(&self, delimiter: char) -> String {
        let mut line = String::from("Channel");
        for stat in &self.columns {
            line.push(delimiter);
            line.push_str(stat.header());
        }
        line
    }

    /// Render as delimited text with a header line. Output depends only on the
    /// records, columns and precision, so identical tables render to identical
    /// bytes.
    pub fn to_delimited(&self, delimiter: char) -> String {
        let mut out = self.header(delimiter);
        out.push('\n');
        for record in &self.records {
            // Writing into a String cannot fail.
            let _ = write!(out, "{}", record.channel);
            for &stat in &self.columns {
                let _ = write!(out, "{}{:.*}", delimiter, self.precision, record.value(stat));
            }
            out.push('\n');
        }
        out
    }
}
