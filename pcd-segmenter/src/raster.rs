/// Position of the channel axis in a color buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    /// `[channel][row][col]`
    First,
    /// `[row][col][channel]`
    Last,
}

pub const COLOR_CHANNELS: usize = 3;

/// Segment id per pixel, row-major. 0 is background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRaster {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u32>,
}

impl LabelRaster {
    pub fn new(width: u32, height: u32, data: Vec<u32>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn get(&self, row: u32, col: u32) -> u32 {
        self.data[row as usize * self.width as usize + col as usize]
    }

    /// Highest segment id, used as the number of segments found.
    pub fn max_label(&self) -> u32 {
        self.data.iter().copied().max().unwrap_or(0)
    }
}

/// RGB render of a segmented view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorRaster {
    pub width: u32,
    pub height: u32,
    pub layout: ChannelLayout,
    pub data: Vec<u8>,
}

impl ColorRaster {
    pub fn new(width: u32, height: u32, layout: ChannelLayout, data: Vec<u8>) -> Self {
        debug_assert_eq!(
            data.len(),
            width as usize * height as usize * COLOR_CHANNELS
        );
        Self {
            width,
            height,
            layout,
            data,
        }
    }

    fn index(&self, row: u32, col: u32, channel: usize) -> usize {
        let (w, h) = (self.width as usize, self.height as usize);
        let (row, col) = (row as usize, col as usize);
        match self.layout {
            ChannelLayout::First => channel * h * w + row * w + col,
            ChannelLayout::Last => (row * w + col) * COLOR_CHANNELS + channel,
        }
    }

    pub fn pixel(&self, row: u32, col: u32) -> [u8; 3] {
        [
            self.data[self.index(row, col, 0)],
            self.data[self.index(row, col, 1)],
            self.data[self.index(row, col, 2)],
        ]
    }

    /// Interleaves planar data; already interleaved rasters are returned as is.
    pub fn to_channel_last(&self) -> ColorRaster {
        if self.layout == ChannelLayout::Last {
            return self.clone();
        }

        let mut data = Vec::with_capacity(self.data.len());
        for row in 0..self.height {
            for col in 0..self.width {
                data.extend_from_slice(&self.pixel(row, col));
            }
        }

        ColorRaster::new(self.width, self.height, ChannelLayout::Last, data)
    }
}
